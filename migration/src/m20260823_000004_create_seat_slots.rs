use sea_orm_migration::prelude::*;

use super::{
  m20260823_000002_create_tour_dates::TourDates,
  m20260823_000003_create_bookings::Bookings,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(SeatSlots::Table)
          .if_not_exists()
          .col(ColumnDef::new(SeatSlots::TourDateId).big_integer().not_null())
          .col(ColumnDef::new(SeatSlots::SeatNumber).integer().not_null())
          .col(
            ColumnDef::new(SeatSlots::Status)
              .string()
              .not_null()
              .default("available"),
          )
          .col(ColumnDef::new(SeatSlots::BookingId).big_integer().null())
          .col(ColumnDef::new(SeatSlots::PassengerName).string().null())
          .primary_key(
            Index::create()
              .col(SeatSlots::TourDateId)
              .col(SeatSlots::SeatNumber),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_seat_slots_tour_date")
              .from(SeatSlots::Table, SeatSlots::TourDateId)
              .to(TourDates::Table, TourDates::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_seat_slots_booking")
              .from(SeatSlots::Table, SeatSlots::BookingId)
              .to(Bookings::Table, Bookings::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_seat_slots_booking")
          .table(SeatSlots::Table)
          .col(SeatSlots::BookingId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(SeatSlots::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum SeatSlots {
  Table,
  TourDateId,
  SeatNumber,
  Status,
  BookingId,
  PassengerName,
}
