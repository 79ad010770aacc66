use std::env;

use crate::{events::EventBus, prelude::*, sv};

pub struct Config {
  pub platform_fee: i64,
  /// Cap on paid upline levels; `None` walks to the group root.
  pub commission_levels: Option<u32>,
}

impl Config {
  pub fn from_env() -> Self {
    let platform_fee = env::var("PLATFORM_FEE")
      .ok()
      .and_then(|v| v.parse().ok())
      .unwrap_or(0);
    let commission_levels =
      env::var("COMMISSION_LEVELS").ok().and_then(|v| v.parse().ok());
    Self { platform_fee, commission_levels }
  }
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub events: EventBus,
  pub config: Config,
}

impl AppState {
  pub async fn new(db_url: &str, config: Config) -> Self {
    let db = Database::connect(db_url)
      .await
      .expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    Self { db, events: EventBus::default(), config }
  }

  pub fn ledger(&self) -> sv::Ledger<'_> {
    sv::Ledger::new(&self.db, &self.events)
      .with_commission_levels(self.config.commission_levels)
  }

  pub fn withdrawals(&self) -> sv::Withdrawals<'_> {
    sv::Withdrawals::new(&self.db, &self.events)
  }
}
