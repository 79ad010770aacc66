pub use sea_orm_migration::prelude::*;

mod m20260823_000001_create_accounts;
mod m20260823_000002_create_tour_dates;
mod m20260823_000003_create_bookings;
mod m20260823_000004_create_seat_slots;
mod m20260823_000005_create_commissions;
mod m20260823_000006_create_withdrawals;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260823_000001_create_accounts::Migration),
      Box::new(m20260823_000002_create_tour_dates::Migration),
      Box::new(m20260823_000003_create_bookings::Migration),
      Box::new(m20260823_000004_create_seat_slots::Migration),
      Box::new(m20260823_000005_create_commissions::Migration),
      Box::new(m20260823_000006_create_withdrawals::Migration),
    ]
  }
}
