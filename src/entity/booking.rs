use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{account, commission, seat_slot, tour_date};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum BookingStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "confirmed")]
  Confirmed,
  #[sea_orm(string_value = "cancelled")]
  Cancelled,
}

impl BookingStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      BookingStatus::Pending => "pending",
      BookingStatus::Confirmed => "confirmed",
      BookingStatus::Cancelled => "cancelled",
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub account_id: i64,
  pub tour_date_id: i64,
  pub status: BookingStatus,
  pub platform_fee: i64,
  /// Seats × price per seat + platform fee, fixed at creation.
  pub total_amount: i64,
  pub created_at: DateTime,
  pub confirmed_at: Option<DateTime>,
  pub cancelled_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "account::Entity",
    from = "Column::AccountId",
    to = "account::Column::Id"
  )]
  Account,
  #[sea_orm(
    belongs_to = "tour_date::Entity",
    from = "Column::TourDateId",
    to = "tour_date::Column::Id"
  )]
  TourDate,
  #[sea_orm(has_many = "seat_slot::Entity")]
  SeatSlots,
  #[sea_orm(has_many = "commission::Entity")]
  Commissions,
}

impl Related<account::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Account.def()
  }
}

impl Related<tour_date::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::TourDate.def()
  }
}

impl Related<seat_slot::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::SeatSlots.def()
  }
}

impl Related<commission::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Commissions.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
