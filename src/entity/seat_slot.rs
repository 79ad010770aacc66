use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{booking, tour_date};

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum SeatStatus {
  #[sea_orm(string_value = "available")]
  #[default]
  Available,
  #[sea_orm(string_value = "booked")]
  Booked,
}

/// One bookable unit of capacity on a departure. `booking_id` is Some
/// iff status is `Booked`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "seat_slots")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub tour_date_id: i64,
  #[sea_orm(primary_key, auto_increment = false)]
  pub seat_number: i32,
  pub status: SeatStatus,
  pub booking_id: Option<i64>,
  pub passenger_name: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "tour_date::Entity",
    from = "Column::TourDateId",
    to = "tour_date::Column::Id"
  )]
  TourDate,
  #[sea_orm(
    belongs_to = "booking::Entity",
    from = "Column::BookingId",
    to = "booking::Column::Id"
  )]
  Booking,
}

impl Related<tour_date::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::TourDate.def()
  }
}

impl Related<booking::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Booking.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
