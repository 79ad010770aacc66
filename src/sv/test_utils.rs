//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema,
  };

  use crate::{
    entity::*,
    prelude::*,
    sv,
  };

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(account::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(tour_date::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(booking::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(seat_slot::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(commission::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(withdrawal::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  pub async fn reseller(
    db: &DatabaseConnection,
    name: &str,
    base_commission: i64,
    upline_commission: i64,
  ) -> account::Model {
    sv::Accounts::new(db)
      .register_reseller(name, base_commission, upline_commission, None)
      .await
      .unwrap()
  }

  pub async fn account(
    db: &DatabaseConnection,
    name: &str,
    role: AccountRole,
  ) -> account::Model {
    sv::Accounts::new(db).register(name, role).await.unwrap()
  }

  pub async fn tour(
    db: &DatabaseConnection,
    supplier_id: i64,
    seat_count: i32,
    price_per_seat: i64,
  ) -> tour_date::Model {
    sv::Inventory::new(db)
      .create_tour_date(
        supplier_id,
        "Test departure",
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        price_per_seat,
        seat_count,
      )
      .await
      .unwrap()
  }

  /// Inserts a bare PENDING booking row, bypassing seat reservation.
  pub async fn pending_booking(
    db: &DatabaseConnection,
    account_id: i64,
    tour_date_id: i64,
  ) -> booking::Model {
    let now = Utc::now().naive_utc();
    booking::ActiveModel {
      id: NotSet,
      account_id: Set(account_id),
      tour_date_id: Set(tour_date_id),
      status: Set(BookingStatus::Pending),
      platform_fee: Set(0),
      total_amount: Set(0),
      created_at: Set(now),
      confirmed_at: Set(None),
      cancelled_at: Set(None),
    }
    .insert(db)
    .await
    .unwrap()
  }
}
