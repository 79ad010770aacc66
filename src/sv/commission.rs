use crate::{
  entity::{AccountRole, BookingStatus, account, booking, commission},
  prelude::*,
  sv::{Inventory, Referral},
};

/// Posts commission per confirmed booking: level 0 pays the owning
/// reseller's base rate per seat, every upline level pays that
/// ancestor's own flat upline rate per seat.
pub struct Commission<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Commission<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn accrue(
    &self,
    booking_id: i64,
    max_levels: Option<u32>,
  ) -> Result<Vec<commission::Model>> {
    let txn = self.db.begin().await?;
    let booking = booking::Entity::find_by_id(booking_id)
      .one(&txn)
      .await?
      .ok_or(Error::BookingNotFound)?;
    let records = Self::accrue_on(&txn, &booking, max_levels).await?;
    txn.commit().await?;
    Ok(records)
  }

  /// Runs on the caller's transaction; `Ledger::confirm` composes this
  /// with the status flip so both commit or roll back together.
  pub(crate) async fn accrue_on<C: ConnectionTrait>(
    conn: &C,
    booking: &booking::Model,
    max_levels: Option<u32>,
  ) -> Result<Vec<commission::Model>> {
    let existing = commission::Entity::find()
      .filter(commission::Column::BookingId.eq(booking.id))
      .count(conn)
      .await?;
    if existing > 0 {
      return Err(Error::DuplicateAccrual(booking.id));
    }

    let owner = account::Entity::find_by_id(booking.account_id)
      .one(conn)
      .await?
      .ok_or(Error::AccountNotFound)?;
    if !owner.role.earns_commission() {
      // customer-owned bookings confirm without commission
      return Ok(Vec::new());
    }

    let seats = Inventory::booked_seats_on(conn, booking.id).await? as i64;
    let now = Utc::now().naive_utc();
    let mut records = Vec::new();

    records.push(
      Self::post_on(conn, booking.id, owner.id, 0, owner.base_commission * seats, now)
        .await?,
    );

    let ancestors = Referral::ancestors_on(conn, owner.id, max_levels).await?;
    for (index, ancestor) in ancestors.iter().enumerate() {
      records.push(
        Self::post_on(
          conn,
          booking.id,
          ancestor.id,
          index as i32 + 1,
          ancestor.upline_commission * seats,
          now,
        )
        .await?,
      );
    }

    Ok(records)
  }

  async fn post_on<C: ConnectionTrait>(
    conn: &C,
    booking_id: i64,
    reseller_id: i64,
    level: i32,
    amount: i64,
    now: DateTime,
  ) -> Result<commission::Model> {
    Ok(
      commission::ActiveModel {
        id: NotSet,
        booking_id: Set(booking_id),
        reseller_id: Set(reseller_id),
        level: Set(level),
        amount: Set(amount),
        created_at: Set(now),
      }
      .insert(conn)
      .await?,
    )
  }

  /// Voids every record tied to `booking_id`. Safe on a booking without
  /// records.
  pub async fn reverse(&self, booking_id: i64) -> Result<u64> {
    Self::reverse_on(self.db, booking_id).await
  }

  pub(crate) async fn reverse_on<C: ConnectionTrait>(
    conn: &C,
    booking_id: i64,
  ) -> Result<u64> {
    let result = commission::Entity::delete_many()
      .filter(commission::Column::BookingId.eq(booking_id))
      .exec(conn)
      .await?;
    Ok(result.rows_affected)
  }

  /// Commission earned from CONFIRMED bookings only. Cancelled bookings
  /// have their records reversed already; the status filter stays as
  /// defense in depth.
  pub async fn total_earned(&self, reseller_id: i64) -> Result<i64> {
    Self::total_earned_on(self.db, reseller_id).await
  }

  pub(crate) async fn total_earned_on<C: ConnectionTrait>(
    conn: &C,
    reseller_id: i64,
  ) -> Result<i64> {
    use sea_orm::sea_query::Expr;

    let sum: Option<Option<i64>> = commission::Entity::find()
      .inner_join(booking::Entity)
      .filter(commission::Column::ResellerId.eq(reseller_id))
      .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
      .select_only()
      .column_as(
        Expr::col((commission::Entity, commission::Column::Amount)).sum(),
        "earned",
      )
      .into_tuple()
      .one(conn)
      .await?;

    Ok(sum.flatten().unwrap_or(0))
  }

  pub async fn by_booking(
    &self,
    booking_id: i64,
  ) -> Result<Vec<commission::Model>> {
    Ok(
      commission::Entity::find()
        .filter(commission::Column::BookingId.eq(booking_id))
        .order_by_asc(commission::Column::Level)
        .all(self.db)
        .await?,
    )
  }

  pub async fn history(
    &self,
    reseller_id: i64,
    limit: u64,
  ) -> Result<Vec<commission::Model>> {
    Ok(
      commission::Entity::find()
        .filter(commission::Column::ResellerId.eq(reseller_id))
        .order_by_desc(commission::Column::CreatedAt)
        .limit(limit)
        .all(self.db)
        .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    sv::{Referral, inventory::SeatRequest, test_utils::test_db},
    sv,
  };

  async fn booked(
    db: &DatabaseConnection,
    account_id: i64,
    seats: i32,
  ) -> booking::Model {
    let supplier = test_db::account(db, "Ops", AccountRole::Supplier).await;
    let tour = test_db::tour(db, supplier.id, seats, 250_000).await;
    let booking = test_db::pending_booking(db, account_id, tour.id).await;
    let requests: Vec<SeatRequest> = (1..=seats)
      .map(|number| SeatRequest { seat_number: number, passenger_name: None })
      .collect();
    sv::Inventory::new(db)
      .reserve(tour.id, booking.id, &requests)
      .await
      .unwrap();
    booking
  }

  #[tokio::test]
  async fn test_two_level_accrual() {
    let db = test_db::setup().await;

    // A (base 100_000, upline 50_000) sponsors B (base 80_000,
    // upline 30_000); B sells 3 seats
    let a = test_db::reseller(&db, "A", 100_000, 50_000).await;
    let b = test_db::reseller(&db, "B", 80_000, 30_000).await;
    Referral::new(&db).assign_sponsor(b.id, a.id).await.unwrap();

    let booking = booked(&db, b.id, 3).await;
    let records =
      Commission::new(&db).accrue(booking.id, None).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].reseller_id, b.id);
    assert_eq!(records[0].level, 0);
    assert_eq!(records[0].amount, 240_000);
    assert_eq!(records[1].reseller_id, a.id);
    assert_eq!(records[1].level, 1);
    assert_eq!(records[1].amount, 150_000);
  }

  #[tokio::test]
  async fn test_accrue_is_exactly_once() {
    let db = test_db::setup().await;

    let b = test_db::reseller(&db, "B", 80_000, 30_000).await;
    let booking = booked(&db, b.id, 2).await;
    let sv = Commission::new(&db);

    sv.accrue(booking.id, None).await.unwrap();
    let before = sv.by_booking(booking.id).await.unwrap().len();

    let result = sv.accrue(booking.id, None).await;
    assert!(matches!(result, Err(Error::DuplicateAccrual(id)) if id == booking.id));

    assert_eq!(sv.by_booking(booking.id).await.unwrap().len(), before);
  }

  #[tokio::test]
  async fn test_customer_booking_accrues_nothing() {
    let db = test_db::setup().await;

    let customer =
      test_db::account(&db, "Walk-in", AccountRole::Customer).await;
    let booking = booked(&db, customer.id, 2).await;

    let records =
      Commission::new(&db).accrue(booking.id, None).await.unwrap();
    assert!(records.is_empty());
  }

  #[tokio::test]
  async fn test_level_cap_bounds_upline() {
    let db = test_db::setup().await;
    let referral = Referral::new(&db);

    let a = test_db::reseller(&db, "A", 100_000, 50_000).await;
    let b = test_db::reseller(&db, "B", 80_000, 30_000).await;
    let c = test_db::reseller(&db, "C", 70_000, 20_000).await;
    referral.assign_sponsor(b.id, a.id).await.unwrap();
    referral.assign_sponsor(c.id, b.id).await.unwrap();

    let booking = booked(&db, c.id, 2).await;
    let records =
      Commission::new(&db).accrue(booking.id, Some(1)).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].reseller_id, b.id);
    assert_eq!(records[1].level, 1);
  }

  #[tokio::test]
  async fn test_reverse_is_noop_safe() {
    let db = test_db::setup().await;

    let b = test_db::reseller(&db, "B", 80_000, 30_000).await;
    let booking = booked(&db, b.id, 1).await;
    let sv = Commission::new(&db);

    assert_eq!(sv.reverse(booking.id).await.unwrap(), 0);

    sv.accrue(booking.id, None).await.unwrap();
    assert_eq!(sv.reverse(booking.id).await.unwrap(), 1);
    assert!(sv.by_booking(booking.id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_total_earned_counts_confirmed_only() {
    let db = test_db::setup().await;

    let b = test_db::reseller(&db, "B", 80_000, 30_000).await;
    let booking = booked(&db, b.id, 2).await;
    let sv = Commission::new(&db);
    sv.accrue(booking.id, None).await.unwrap();

    // still pending, so nothing counts yet
    assert_eq!(sv.total_earned(b.id).await.unwrap(), 0);

    booking::ActiveModel {
      status: Set(BookingStatus::Confirmed),
      ..booking.into()
    }
    .update(&db)
    .await
    .unwrap();

    assert_eq!(sv.total_earned(b.id).await.unwrap(), 160_000);
  }
}
