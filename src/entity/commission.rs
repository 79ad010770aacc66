use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{account, booking};

/// One commission posting for one (booking, beneficiary) pair.
/// Immutable once written; cancellation deletes it instead of editing.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "commissions")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub booking_id: i64,
  pub reseller_id: i64,
  /// 0 = own sale, 1 = direct sponsor, 2+ = higher upline.
  pub level: i32,
  pub amount: i64,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "booking::Entity",
    from = "Column::BookingId",
    to = "booking::Column::Id"
  )]
  Booking,
  #[sea_orm(
    belongs_to = "account::Entity",
    from = "Column::ResellerId",
    to = "account::Column::Id"
  )]
  Reseller,
}

impl Related<booking::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Booking.def()
  }
}

impl Related<account::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Reseller.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
