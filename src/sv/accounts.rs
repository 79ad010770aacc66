use uuid::Uuid;

use crate::{
  entity::{AccountRole, account},
  prelude::*,
  sv,
};

pub struct Accounts<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Accounts<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Register a non-reseller account. Resellers go through
  /// `register_reseller` so they get a referral code and commission
  /// rates.
  pub async fn register(
    &self,
    display_name: &str,
    role: AccountRole,
  ) -> Result<account::Model> {
    if role == AccountRole::Reseller {
      return Err(Error::InvalidArgs(
        "Resellers must register via register_reseller".into(),
      ));
    }

    let txn = self.db.begin().await?;
    let account =
      Self::insert_account(&txn, display_name, role, None, 0, 0).await?;
    txn.commit().await?;
    Ok(account)
  }

  pub async fn register_reseller(
    &self,
    display_name: &str,
    base_commission: i64,
    upline_commission: i64,
    sponsor_code: Option<&str>,
  ) -> Result<account::Model> {
    if base_commission < 0 || upline_commission < 0 {
      return Err(Error::InvalidArgs(
        "Commission rates must not be negative".into(),
      ));
    }

    let code = Uuid::new_v4().simple().to_string()[..8].to_uppercase();

    let txn = self.db.begin().await?;

    // resolve the sponsor first; an unknown code must not leave a
    // half-registered account behind
    let sponsor = match sponsor_code {
      Some(code) => Some(
        account::Entity::find()
          .filter(account::Column::ReferralCode.eq(code))
          .one(&txn)
          .await?
          .ok_or(Error::AccountNotFound)?,
      ),
      None => None,
    };

    let mut account = Self::insert_account(
      &txn,
      display_name,
      AccountRole::Reseller,
      Some(code),
      base_commission,
      upline_commission,
    )
    .await?;

    if let Some(sponsor) = sponsor {
      sv::Referral::assign_sponsor_on(&txn, account.id, sponsor.id).await?;
      account = account::Entity::find_by_id(account.id)
        .one(&txn)
        .await?
        .ok_or(Error::AccountNotFound)?;
    }

    txn.commit().await?;
    Ok(account)
  }

  async fn insert_account<C: ConnectionTrait>(
    conn: &C,
    display_name: &str,
    role: AccountRole,
    referral_code: Option<String>,
    base_commission: i64,
    upline_commission: i64,
  ) -> Result<account::Model> {
    let now = Utc::now().naive_utc();
    let inserted = account::ActiveModel {
      id: NotSet,
      display_name: Set(display_name.to_string()),
      role: Set(role),
      referral_code: Set(referral_code),
      sponsor_id: Set(None),
      group_root_id: Set(0),
      base_commission: Set(base_commission),
      upline_commission: Set(upline_commission),
      bank_name: Set(None),
      bank_account: Set(None),
      is_active: Set(true),
      created_at: Set(now),
    }
    .insert(conn)
    .await?;

    // a sponsorless account roots its own group; the id is only known
    // after the insert
    Ok(
      account::ActiveModel {
        group_root_id: Set(inserted.id),
        ..inserted.into()
      }
      .update(conn)
      .await?,
    )
  }

  pub async fn by_id(&self, id: i64) -> Result<Option<account::Model>> {
    Ok(account::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn by_referral_code(
    &self,
    code: &str,
  ) -> Result<Option<account::Model>> {
    Ok(
      account::Entity::find()
        .filter(account::Column::ReferralCode.eq(code))
        .one(self.db)
        .await?,
    )
  }

  pub async fn set_bank_details(
    &self,
    id: i64,
    bank_name: &str,
    bank_account: &str,
  ) -> Result<()> {
    let account = account::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::AccountNotFound)?;

    match account.role {
      AccountRole::Reseller => {}
      AccountRole::Supplier | AccountRole::Customer | AccountRole::Staff => {
        return Err(Error::RoleNotPermitted);
      }
    }

    account::ActiveModel {
      bank_name: Set(Some(bank_name.to_string())),
      bank_account: Set(Some(bank_account.to_string())),
      ..account.into()
    }
    .update(self.db)
    .await?;

    Ok(())
  }

  /// Accounts are never deleted, only deactivated.
  pub async fn deactivate(&self, id: i64) -> Result<()> {
    let account = account::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::AccountNotFound)?;

    account::ActiveModel { is_active: Set(false), ..account.into() }
      .update(self.db)
      .await?;

    Ok(())
  }
}
