use crate::{
  entity::{BookingStatus, account, booking, tour_date},
  events::{Event, EventBus},
  prelude::*,
  sv::{Commission, Inventory, inventory::SeatRequest},
};

/// The booking state machine. PENDING -> CONFIRMED | CANCELLED,
/// CONFIRMED -> CANCELLED, CANCELLED is terminal. Seat assignment,
/// commission accrual and the status flip always share one transaction;
/// events go out only after that transaction commits.
pub struct Ledger<'a> {
  db: &'a DatabaseConnection,
  events: &'a EventBus,
  commission_levels: Option<u32>,
}

impl<'a> Ledger<'a> {
  pub fn new(db: &'a DatabaseConnection, events: &'a EventBus) -> Self {
    Self { db, events, commission_levels: None }
  }

  pub fn with_commission_levels(mut self, levels: Option<u32>) -> Self {
    self.commission_levels = levels;
    self
  }

  /// Creates a PENDING booking and claims its seats. If any seat claim
  /// fails the whole transaction rolls back and no booking row remains.
  pub async fn create(
    &self,
    account_id: i64,
    tour_date_id: i64,
    seats: &[SeatRequest],
    platform_fee: i64,
  ) -> Result<booking::Model> {
    if platform_fee < 0 {
      return Err(Error::InvalidArgs(
        "Platform fee must not be negative".into(),
      ));
    }

    let txn = self.db.begin().await?;

    let account = account::Entity::find_by_id(account_id)
      .one(&txn)
      .await?
      .ok_or(Error::AccountNotFound)?;
    if !account.role.can_book() {
      return Err(Error::RoleNotPermitted);
    }
    if !account.is_active {
      return Err(Error::InvalidArgs("Account is deactivated".into()));
    }

    let tour = tour_date::Entity::find_by_id(tour_date_id)
      .one(&txn)
      .await?
      .ok_or(Error::TourDateNotFound)?;

    let now = Utc::now().naive_utc();
    let total = tour.price_per_seat * seats.len() as i64 + platform_fee;
    let booking = booking::ActiveModel {
      id: NotSet,
      account_id: Set(account_id),
      tour_date_id: Set(tour_date_id),
      status: Set(BookingStatus::Pending),
      platform_fee: Set(platform_fee),
      total_amount: Set(total),
      created_at: Set(now),
      confirmed_at: Set(None),
      cancelled_at: Set(None),
    }
    .insert(&txn)
    .await?;

    Inventory::reserve_on(&txn, tour_date_id, booking.id, seats).await?;

    txn.commit().await?;
    info!("booking {} created for account {}", booking.id, account_id);
    Ok(booking)
  }

  /// Confirms a PENDING booking and accrues its commission in the same
  /// transaction.
  pub async fn confirm(&self, booking_id: i64) -> Result<booking::Model> {
    use sea_orm::sea_query::Expr;

    let txn = self.db.begin().await?;

    let booking = booking::Entity::find_by_id(booking_id)
      .one(&txn)
      .await?
      .ok_or(Error::BookingNotFound)?;
    match booking.status {
      BookingStatus::Pending => {}
      other => {
        return Err(Error::InvalidTransition {
          from: other.as_str(),
          to: BookingStatus::Confirmed.as_str(),
        });
      }
    }

    Commission::accrue_on(&txn, &booking, self.commission_levels).await?;

    // the flip only lands if the booking is still PENDING, so a racing
    // transition cannot confirm twice
    let result = booking::Entity::update_many()
      .col_expr(booking::Column::Status, Expr::value(BookingStatus::Confirmed))
      .col_expr(
        booking::Column::ConfirmedAt,
        Expr::value(Some(Utc::now().naive_utc())),
      )
      .filter(booking::Column::Id.eq(booking_id))
      .filter(booking::Column::Status.eq(BookingStatus::Pending))
      .exec(&txn)
      .await?;
    if result.rows_affected == 0 {
      let current = booking::Entity::find_by_id(booking_id)
        .one(&txn)
        .await?
        .ok_or(Error::BookingNotFound)?;
      return Err(Error::InvalidTransition {
        from: current.status.as_str(),
        to: BookingStatus::Confirmed.as_str(),
      });
    }

    let updated = booking::Entity::find_by_id(booking_id)
      .one(&txn)
      .await?
      .ok_or(Error::BookingNotFound)?;

    txn.commit().await?;

    self.events.publish(Event::BookingConfirmed {
      booking_id: updated.id,
      account_id: booking.account_id,
      total_amount: booking.total_amount,
    });
    Ok(updated)
  }

  /// Cancels a PENDING or CONFIRMED booking, returning its seats and
  /// reversing any accrued commission.
  pub async fn cancel(&self, booking_id: i64) -> Result<booking::Model> {
    use sea_orm::sea_query::Expr;

    let txn = self.db.begin().await?;

    let booking = booking::Entity::find_by_id(booking_id)
      .one(&txn)
      .await?
      .ok_or(Error::BookingNotFound)?;
    let was_confirmed = match booking.status {
      BookingStatus::Pending => false,
      BookingStatus::Confirmed => true,
      BookingStatus::Cancelled => {
        return Err(Error::InvalidTransition {
          from: BookingStatus::Cancelled.as_str(),
          to: BookingStatus::Cancelled.as_str(),
        });
      }
    };

    Inventory::release_on(&txn, booking_id).await?;
    Commission::reverse_on(&txn, booking_id).await?;

    // same guarded flip as confirm, keyed on the status we observed
    let result = booking::Entity::update_many()
      .col_expr(booking::Column::Status, Expr::value(BookingStatus::Cancelled))
      .col_expr(
        booking::Column::CancelledAt,
        Expr::value(Some(Utc::now().naive_utc())),
      )
      .filter(booking::Column::Id.eq(booking_id))
      .filter(booking::Column::Status.eq(booking.status))
      .exec(&txn)
      .await?;
    if result.rows_affected == 0 {
      let current = booking::Entity::find_by_id(booking_id)
        .one(&txn)
        .await?
        .ok_or(Error::BookingNotFound)?;
      return Err(Error::InvalidTransition {
        from: current.status.as_str(),
        to: BookingStatus::Cancelled.as_str(),
      });
    }

    let updated = booking::Entity::find_by_id(booking_id)
      .one(&txn)
      .await?
      .ok_or(Error::BookingNotFound)?;

    txn.commit().await?;

    self.events.publish(Event::BookingCancelled {
      booking_id: updated.id,
      account_id: booking.account_id,
      was_confirmed,
    });
    Ok(updated)
  }

  pub async fn by_id(&self, booking_id: i64) -> Result<Option<booking::Model>> {
    Ok(booking::Entity::find_by_id(booking_id).one(self.db).await?)
  }

  pub async fn history(
    &self,
    account_id: i64,
    limit: u64,
  ) -> Result<Vec<booking::Model>> {
    Ok(
      booking::Entity::find()
        .filter(booking::Column::AccountId.eq(account_id))
        .order_by_desc(booking::Column::CreatedAt)
        .limit(limit)
        .all(self.db)
        .await?,
    )
  }
}
