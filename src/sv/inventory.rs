use serde::Deserialize;

use crate::{
  entity::{AccountRole, SeatStatus, account, seat_slot, tour_date},
  prelude::*,
};

#[derive(Debug, Clone, Deserialize)]
pub struct SeatRequest {
  pub seat_number: i32,
  pub passenger_name: Option<String>,
}

/// Exclusive seat-slot assignment. Slots are the single contended
/// resource between concurrent bookings; every claim is a conditional
/// update guarded on the slot still being available.
pub struct Inventory<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Inventory<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Creates the departure and its fixed set of seat slots together.
  pub async fn create_tour_date(
    &self,
    supplier_id: i64,
    title: &str,
    departs_on: NaiveDate,
    price_per_seat: i64,
    seat_count: i32,
  ) -> Result<tour_date::Model> {
    if seat_count <= 0 {
      return Err(Error::InvalidArgs("Seat count must be positive".into()));
    }
    if price_per_seat < 0 {
      return Err(Error::InvalidArgs(
        "Price per seat must not be negative".into(),
      ));
    }

    let supplier = account::Entity::find_by_id(supplier_id)
      .one(self.db)
      .await?
      .ok_or(Error::AccountNotFound)?;
    match supplier.role {
      AccountRole::Supplier => {}
      AccountRole::Reseller | AccountRole::Customer | AccountRole::Staff => {
        return Err(Error::RoleNotPermitted);
      }
    }

    let txn = self.db.begin().await?;

    let now = Utc::now().naive_utc();
    let tour = tour_date::ActiveModel {
      id: NotSet,
      supplier_id: Set(supplier_id),
      title: Set(title.to_string()),
      departs_on: Set(departs_on),
      price_per_seat: Set(price_per_seat),
      seat_count: Set(seat_count),
      created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    for seat_number in 1..=seat_count {
      seat_slot::ActiveModel {
        tour_date_id: Set(tour.id),
        seat_number: Set(seat_number),
        status: Set(SeatStatus::Available),
        booking_id: Set(None),
        passenger_name: Set(None),
      }
      .insert(&txn)
      .await?;
    }

    txn.commit().await?;
    Ok(tour)
  }

  pub async fn reserve(
    &self,
    tour_date_id: i64,
    booking_id: i64,
    seats: &[SeatRequest],
  ) -> Result<()> {
    let txn = self.db.begin().await?;
    Self::reserve_on(&txn, tour_date_id, booking_id, seats).await?;
    txn.commit().await?;
    Ok(())
  }

  /// Runs on the caller's transaction so booking creation and seat
  /// assignment commit or roll back together.
  pub(crate) async fn reserve_on<C: ConnectionTrait>(
    conn: &C,
    tour_date_id: i64,
    booking_id: i64,
    seats: &[SeatRequest],
  ) -> Result<()> {
    use sea_orm::sea_query::Expr;

    if seats.is_empty() {
      return Err(Error::InvalidArgs("At least one seat is required".into()));
    }

    let mut seen = HashSet::new();
    let mut duplicates: Vec<i32> = seats
      .iter()
      .map(|seat| seat.seat_number)
      .filter(|number| !seen.insert(*number))
      .collect();
    if !duplicates.is_empty() {
      duplicates.sort_unstable();
      duplicates.dedup();
      return Err(Error::DuplicateSeatRequest(duplicates));
    }

    let numbers: Vec<i32> = seats.iter().map(|seat| seat.seat_number).collect();
    let slots = seat_slot::Entity::find()
      .filter(seat_slot::Column::TourDateId.eq(tour_date_id))
      .filter(seat_slot::Column::SeatNumber.is_in(numbers.clone()))
      .all(conn)
      .await?;

    if slots.len() != seats.len() {
      let known: HashSet<i32> =
        slots.iter().map(|slot| slot.seat_number).collect();
      let mut missing: Vec<i32> =
        numbers.into_iter().filter(|number| !known.contains(number)).collect();
      missing.sort_unstable();
      return Err(Error::SeatUnavailable(missing));
    }

    // claim seat by seat in seat-number order, so overlapping
    // reservations always contend in the same order; a claim only lands
    // if the slot is still available, so two overlapping reservations
    // cannot both win
    let mut ordered: Vec<&SeatRequest> = seats.iter().collect();
    ordered.sort_unstable_by_key(|seat| seat.seat_number);

    let mut conflicts = Vec::new();
    for seat in ordered {
      let result = seat_slot::Entity::update_many()
        .col_expr(seat_slot::Column::Status, Expr::value(SeatStatus::Booked))
        .col_expr(seat_slot::Column::BookingId, Expr::value(Some(booking_id)))
        .col_expr(
          seat_slot::Column::PassengerName,
          Expr::value(seat.passenger_name.clone()),
        )
        .filter(seat_slot::Column::TourDateId.eq(tour_date_id))
        .filter(seat_slot::Column::SeatNumber.eq(seat.seat_number))
        .filter(seat_slot::Column::Status.eq(SeatStatus::Available))
        .exec(conn)
        .await?;

      if result.rows_affected == 0 {
        conflicts.push(seat.seat_number);
      }
    }

    if !conflicts.is_empty() {
      conflicts.sort_unstable();
      return Err(Error::SeatUnavailable(conflicts));
    }

    Ok(())
  }

  /// Returns every slot held by `booking_id` to the pool. Idempotent.
  pub async fn release(&self, booking_id: i64) -> Result<u64> {
    Self::release_on(self.db, booking_id).await
  }

  pub(crate) async fn release_on<C: ConnectionTrait>(
    conn: &C,
    booking_id: i64,
  ) -> Result<u64> {
    use sea_orm::sea_query::Expr;

    let result = seat_slot::Entity::update_many()
      .col_expr(seat_slot::Column::Status, Expr::value(SeatStatus::Available))
      .col_expr(seat_slot::Column::BookingId, Expr::value(Option::<i64>::None))
      .col_expr(
        seat_slot::Column::PassengerName,
        Expr::value(Option::<String>::None),
      )
      .filter(seat_slot::Column::BookingId.eq(booking_id))
      .exec(conn)
      .await?;

    Ok(result.rows_affected)
  }

  // counts are derived from slot state on every read, never cached

  pub async fn available_count(&self, tour_date_id: i64) -> Result<u64> {
    Ok(
      seat_slot::Entity::find()
        .filter(seat_slot::Column::TourDateId.eq(tour_date_id))
        .filter(seat_slot::Column::Status.eq(SeatStatus::Available))
        .count(self.db)
        .await?,
    )
  }

  pub async fn booked_count(&self, tour_date_id: i64) -> Result<u64> {
    Ok(
      seat_slot::Entity::find()
        .filter(seat_slot::Column::TourDateId.eq(tour_date_id))
        .filter(seat_slot::Column::Status.eq(SeatStatus::Booked))
        .count(self.db)
        .await?,
    )
  }

  pub(crate) async fn booked_seats_on<C: ConnectionTrait>(
    conn: &C,
    booking_id: i64,
  ) -> Result<u64> {
    Ok(
      seat_slot::Entity::find()
        .filter(seat_slot::Column::BookingId.eq(booking_id))
        .count(conn)
        .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  #[tokio::test]
  async fn test_create_tour_date_creates_slots() {
    let db = test_db::setup().await;
    let sv = Inventory::new(&db);

    let supplier = test_db::account(&db, "Ops", AccountRole::Supplier).await;
    let tour = test_db::tour(&db, supplier.id, 4, 250_000).await;

    assert_eq!(tour.seat_count, 4);
    assert_eq!(sv.available_count(tour.id).await.unwrap(), 4);
    assert_eq!(sv.booked_count(tour.id).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_only_suppliers_create_tour_dates() {
    let db = test_db::setup().await;

    let customer = test_db::account(&db, "Walk-in", AccountRole::Customer).await;
    let result = Inventory::new(&db)
      .create_tour_date(
        customer.id,
        "Nope",
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        100_000,
        2,
      )
      .await;

    assert!(matches!(result, Err(Error::RoleNotPermitted)));
  }

  #[tokio::test]
  async fn test_reserve_marks_slots_booked() {
    let db = test_db::setup().await;
    let sv = Inventory::new(&db);

    let supplier = test_db::account(&db, "Ops", AccountRole::Supplier).await;
    let customer = test_db::account(&db, "Walk-in", AccountRole::Customer).await;
    let tour = test_db::tour(&db, supplier.id, 3, 250_000).await;
    let booking = test_db::pending_booking(&db, customer.id, tour.id).await;

    sv.reserve(tour.id, booking.id, &[
      SeatRequest { seat_number: 1, passenger_name: Some("Ann".into()) },
      SeatRequest { seat_number: 2, passenger_name: None },
    ])
    .await
    .unwrap();

    assert_eq!(sv.available_count(tour.id).await.unwrap(), 1);
    assert_eq!(sv.booked_count(tour.id).await.unwrap(), 2);

    let slot = seat_slot::Entity::find_by_id((tour.id, 1))
      .one(&db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(slot.status, SeatStatus::Booked);
    assert_eq!(slot.booking_id, Some(booking.id));
    assert_eq!(slot.passenger_name.as_deref(), Some("Ann"));
  }

  #[tokio::test]
  async fn test_reserve_accepts_unordered_requests() {
    let db = test_db::setup().await;
    let sv = Inventory::new(&db);

    let supplier = test_db::account(&db, "Ops", AccountRole::Supplier).await;
    let customer = test_db::account(&db, "Walk-in", AccountRole::Customer).await;
    let tour = test_db::tour(&db, supplier.id, 3, 250_000).await;
    let booking = test_db::pending_booking(&db, customer.id, tour.id).await;

    sv.reserve(tour.id, booking.id, &[
      SeatRequest { seat_number: 3, passenger_name: Some("Cal".into()) },
      SeatRequest { seat_number: 1, passenger_name: Some("Ann".into()) },
    ])
    .await
    .unwrap();

    // names stay attached to the requested seats whatever the claim order
    let slot = seat_slot::Entity::find_by_id((tour.id, 1))
      .one(&db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(slot.passenger_name.as_deref(), Some("Ann"));
    let slot = seat_slot::Entity::find_by_id((tour.id, 3))
      .one(&db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(slot.passenger_name.as_deref(), Some("Cal"));
    assert_eq!(sv.booked_count(tour.id).await.unwrap(), 2);
  }

  #[tokio::test]
  async fn test_overlapping_reserve_reports_conflicts() {
    let db = test_db::setup().await;
    let sv = Inventory::new(&db);

    let supplier = test_db::account(&db, "Ops", AccountRole::Supplier).await;
    let customer = test_db::account(&db, "Walk-in", AccountRole::Customer).await;
    let tour = test_db::tour(&db, supplier.id, 3, 250_000).await;
    let first = test_db::pending_booking(&db, customer.id, tour.id).await;
    let second = test_db::pending_booking(&db, customer.id, tour.id).await;

    sv.reserve(tour.id, first.id, &[
      SeatRequest { seat_number: 1, passenger_name: None },
      SeatRequest { seat_number: 2, passenger_name: None },
    ])
    .await
    .unwrap();

    let result = sv
      .reserve(tour.id, second.id, &[
        SeatRequest { seat_number: 2, passenger_name: None },
        SeatRequest { seat_number: 3, passenger_name: None },
      ])
      .await;

    assert!(matches!(result, Err(Error::SeatUnavailable(ref seats)) if seats == &[2]));
    // the losing request must not keep seat 3 either
    assert_eq!(sv.available_count(tour.id).await.unwrap(), 1);
  }

  #[tokio::test]
  async fn test_duplicate_seats_rejected() {
    let db = test_db::setup().await;
    let sv = Inventory::new(&db);

    let supplier = test_db::account(&db, "Ops", AccountRole::Supplier).await;
    let customer = test_db::account(&db, "Walk-in", AccountRole::Customer).await;
    let tour = test_db::tour(&db, supplier.id, 3, 250_000).await;
    let booking = test_db::pending_booking(&db, customer.id, tour.id).await;

    let result = sv
      .reserve(tour.id, booking.id, &[
        SeatRequest { seat_number: 1, passenger_name: None },
        SeatRequest { seat_number: 1, passenger_name: None },
      ])
      .await;

    assert!(
      matches!(result, Err(Error::DuplicateSeatRequest(ref seats)) if seats == &[1])
    );
  }

  #[tokio::test]
  async fn test_unknown_seats_rejected() {
    let db = test_db::setup().await;
    let sv = Inventory::new(&db);

    let supplier = test_db::account(&db, "Ops", AccountRole::Supplier).await;
    let customer = test_db::account(&db, "Walk-in", AccountRole::Customer).await;
    let tour = test_db::tour(&db, supplier.id, 2, 250_000).await;
    let booking = test_db::pending_booking(&db, customer.id, tour.id).await;

    let result = sv
      .reserve(tour.id, booking.id, &[
        SeatRequest { seat_number: 1, passenger_name: None },
        SeatRequest { seat_number: 9, passenger_name: None },
      ])
      .await;

    assert!(matches!(result, Err(Error::SeatUnavailable(ref seats)) if seats == &[9]));
    assert_eq!(sv.available_count(tour.id).await.unwrap(), 2);
  }

  #[tokio::test]
  async fn test_release_is_idempotent() {
    let db = test_db::setup().await;
    let sv = Inventory::new(&db);

    let supplier = test_db::account(&db, "Ops", AccountRole::Supplier).await;
    let customer = test_db::account(&db, "Walk-in", AccountRole::Customer).await;
    let tour = test_db::tour(&db, supplier.id, 2, 250_000).await;
    let booking = test_db::pending_booking(&db, customer.id, tour.id).await;

    sv.reserve(tour.id, booking.id, &[SeatRequest {
      seat_number: 1,
      passenger_name: Some("Ann".into()),
    }])
    .await
    .unwrap();

    assert_eq!(sv.release(booking.id).await.unwrap(), 1);
    assert_eq!(sv.release(booking.id).await.unwrap(), 0);
    assert_eq!(sv.available_count(tour.id).await.unwrap(), 2);

    let slot = seat_slot::Entity::find_by_id((tour.id, 1))
      .one(&db)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(slot.status, SeatStatus::Available);
    assert!(slot.booking_id.is_none());
    assert!(slot.passenger_name.is_none());
  }
}
