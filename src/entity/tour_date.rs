use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{account, booking, seat_slot};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tour_dates")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub supplier_id: i64,
  pub title: String,
  pub departs_on: Date,
  pub price_per_seat: i64,
  pub seat_count: i32,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "account::Entity",
    from = "Column::SupplierId",
    to = "account::Column::Id"
  )]
  Supplier,
  #[sea_orm(has_many = "seat_slot::Entity")]
  SeatSlots,
  #[sea_orm(has_many = "booking::Entity")]
  Bookings,
}

impl Related<account::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Supplier.def()
  }
}

impl Related<seat_slot::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::SeatSlots.def()
  }
}

impl Related<booking::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Bookings.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
