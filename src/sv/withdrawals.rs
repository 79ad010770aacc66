use crate::{
  entity::{AccountRole, WithdrawalStatus, account, withdrawal},
  events::{Event, EventBus},
  prelude::*,
  sv::Commission,
};

/// Payout requests against a reseller's commission balance. The balance
/// is never stored; it is derived on every read as
/// earned - (approved + completed) - pending.
pub struct Withdrawals<'a> {
  db: &'a DatabaseConnection,
  events: &'a EventBus,
}

impl<'a> Withdrawals<'a> {
  pub fn new(db: &'a DatabaseConnection, events: &'a EventBus) -> Self {
    Self { db, events }
  }

  pub async fn total_earned(&self, reseller_id: i64) -> Result<i64> {
    Commission::total_earned_on(self.db, reseller_id).await
  }

  pub async fn total_withdrawn(&self, reseller_id: i64) -> Result<i64> {
    Self::status_total_on(self.db, reseller_id, &[
      WithdrawalStatus::Approved,
      WithdrawalStatus::Completed,
    ])
    .await
  }

  pub async fn pending_total(&self, reseller_id: i64) -> Result<i64> {
    Self::status_total_on(self.db, reseller_id, &[WithdrawalStatus::Pending])
      .await
  }

  async fn status_total_on<C: ConnectionTrait>(
    conn: &C,
    reseller_id: i64,
    statuses: &[WithdrawalStatus],
  ) -> Result<i64> {
    use sea_orm::sea_query::Expr;

    let sum: Option<Option<i64>> = withdrawal::Entity::find()
      .filter(withdrawal::Column::ResellerId.eq(reseller_id))
      .filter(withdrawal::Column::Status.is_in(statuses.iter().cloned()))
      .select_only()
      .column_as(Expr::col(withdrawal::Column::Amount).sum(), "total")
      .into_tuple()
      .one(conn)
      .await?;

    Ok(sum.flatten().unwrap_or(0))
  }

  pub async fn available_balance(&self, reseller_id: i64) -> Result<i64> {
    Self::available_on(self.db, reseller_id).await
  }

  async fn available_on<C: ConnectionTrait>(
    conn: &C,
    reseller_id: i64,
  ) -> Result<i64> {
    let earned = Commission::total_earned_on(conn, reseller_id).await?;
    let held = Self::status_total_on(conn, reseller_id, &[
      WithdrawalStatus::Pending,
      WithdrawalStatus::Approved,
      WithdrawalStatus::Completed,
    ])
    .await?;
    Ok((earned - held).max(0))
  }

  /// Files a PENDING request. The reseller row is locked for the span
  /// of the transaction, so concurrent requests against the same
  /// balance serialize instead of both passing the check.
  pub async fn request(
    &self,
    reseller_id: i64,
    amount: i64,
  ) -> Result<withdrawal::Model> {
    if amount <= 0 {
      return Err(Error::InvalidArgs("Amount must be positive".into()));
    }

    let txn = self.db.begin().await?;

    let reseller = account::Entity::find_by_id(reseller_id)
      .lock_exclusive()
      .one(&txn)
      .await?
      .ok_or(Error::AccountNotFound)?;
    match reseller.role {
      AccountRole::Reseller => {}
      AccountRole::Supplier | AccountRole::Customer | AccountRole::Staff => {
        return Err(Error::RoleNotPermitted);
      }
    }

    let available = Self::available_on(&txn, reseller_id).await?;
    if amount > available {
      return Err(Error::InsufficientBalance { available });
    }

    let requested = withdrawal::ActiveModel {
      id: NotSet,
      reseller_id: Set(reseller_id),
      amount: Set(amount),
      status: Set(WithdrawalStatus::Pending),
      approved_by: Set(None),
      created_at: Set(Utc::now().naive_utc()),
      decided_at: Set(None),
      completed_at: Set(None),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!("withdrawal {} requested by reseller {}", requested.id, reseller_id);

    self.events.publish(Event::WithdrawalRequested {
      withdrawal_id: requested.id,
      reseller_id,
      amount,
    });
    Ok(requested)
  }

  pub async fn approve(
    &self,
    withdrawal_id: i64,
    approver_id: i64,
  ) -> Result<withdrawal::Model> {
    let decided =
      self.decide(withdrawal_id, approver_id, WithdrawalStatus::Approved).await?;
    self.events.publish(Event::WithdrawalApproved {
      withdrawal_id: decided.id,
      reseller_id: decided.reseller_id,
      amount: decided.amount,
    });
    Ok(decided)
  }

  /// Rejection returns the amount to the available balance.
  pub async fn reject(
    &self,
    withdrawal_id: i64,
    approver_id: i64,
  ) -> Result<withdrawal::Model> {
    let decided =
      self.decide(withdrawal_id, approver_id, WithdrawalStatus::Rejected).await?;
    self.events.publish(Event::WithdrawalRejected {
      withdrawal_id: decided.id,
      reseller_id: decided.reseller_id,
    });
    Ok(decided)
  }

  async fn decide(
    &self,
    withdrawal_id: i64,
    approver_id: i64,
    verdict: WithdrawalStatus,
  ) -> Result<withdrawal::Model> {
    let txn = self.db.begin().await?;

    let approver = account::Entity::find_by_id(approver_id)
      .one(&txn)
      .await?
      .ok_or(Error::AccountNotFound)?;
    match approver.role {
      AccountRole::Staff => {}
      AccountRole::Supplier | AccountRole::Reseller | AccountRole::Customer => {
        return Err(Error::RoleNotPermitted);
      }
    }

    let withdrawal = withdrawal::Entity::find_by_id(withdrawal_id)
      .one(&txn)
      .await?
      .ok_or(Error::WithdrawalNotFound)?;
    match withdrawal.status {
      WithdrawalStatus::Pending => {}
      other => {
        return Err(Error::InvalidTransition {
          from: other.as_str(),
          to: verdict.as_str(),
        });
      }
    }

    let decided = withdrawal::ActiveModel {
      status: Set(verdict),
      approved_by: Set(Some(approver_id)),
      decided_at: Set(Some(Utc::now().naive_utc())),
      ..withdrawal.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;
    Ok(decided)
  }

  /// Marks an APPROVED withdrawal as paid out.
  pub async fn complete(
    &self,
    withdrawal_id: i64,
  ) -> Result<withdrawal::Model> {
    let txn = self.db.begin().await?;

    let withdrawal = withdrawal::Entity::find_by_id(withdrawal_id)
      .one(&txn)
      .await?
      .ok_or(Error::WithdrawalNotFound)?;
    match withdrawal.status {
      WithdrawalStatus::Approved => {}
      other => {
        return Err(Error::InvalidTransition {
          from: other.as_str(),
          to: WithdrawalStatus::Completed.as_str(),
        });
      }
    }

    let completed = withdrawal::ActiveModel {
      status: Set(WithdrawalStatus::Completed),
      completed_at: Set(Some(Utc::now().naive_utc())),
      ..withdrawal.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;

    self.events.publish(Event::WithdrawalCompleted {
      withdrawal_id: completed.id,
      reseller_id: completed.reseller_id,
      amount: completed.amount,
    });
    Ok(completed)
  }

  pub async fn history(
    &self,
    reseller_id: i64,
    limit: u64,
  ) -> Result<Vec<withdrawal::Model>> {
    Ok(
      withdrawal::Entity::find()
        .filter(withdrawal::Column::ResellerId.eq(reseller_id))
        .order_by_desc(withdrawal::Column::CreatedAt)
        .limit(limit)
        .all(self.db)
        .await?,
    )
  }
}
