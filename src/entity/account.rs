use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{booking, commission, withdrawal};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum AccountRole {
  #[sea_orm(string_value = "supplier")]
  Supplier,
  #[sea_orm(string_value = "reseller")]
  Reseller,
  #[sea_orm(string_value = "customer")]
  #[default]
  Customer,
  #[sea_orm(string_value = "staff")]
  Staff,
}

impl AccountRole {
  /// Roles that hold a place in the referral tree and earn commission.
  pub fn earns_commission(self) -> bool {
    match self {
      AccountRole::Reseller => true,
      AccountRole::Supplier | AccountRole::Customer | AccountRole::Staff => {
        false
      }
    }
  }

  /// Roles that may own bookings.
  pub fn can_book(self) -> bool {
    match self {
      AccountRole::Reseller | AccountRole::Customer => true,
      AccountRole::Supplier | AccountRole::Staff => false,
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub display_name: String,
  pub role: AccountRole,
  /// Unique and immutable once issued; resellers only.
  #[sea_orm(unique)]
  pub referral_code: Option<String>,
  pub sponsor_id: Option<i64>,
  /// Denormalized top of the sponsor chain; equals `id` when sponsorless.
  pub group_root_id: i64,
  pub base_commission: i64,
  pub upline_commission: i64,
  pub bank_name: Option<String>,
  pub bank_account: Option<String>,
  pub is_active: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "booking::Entity")]
  Bookings,
  #[sea_orm(has_many = "commission::Entity")]
  Commissions,
  #[sea_orm(has_many = "withdrawal::Entity")]
  Withdrawals,
  #[sea_orm(belongs_to = "Entity", from = "Column::SponsorId", to = "Column::Id")]
  Sponsor,
}

impl Related<booking::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Bookings.def()
  }
}

impl Related<commission::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Commissions.def()
  }
}

impl Related<withdrawal::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Withdrawals.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
