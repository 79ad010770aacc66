use sea_orm_migration::prelude::*;

use super::{
  m20260823_000001_create_accounts::Accounts,
  m20260823_000002_create_tour_dates::TourDates,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Bookings::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Bookings::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Bookings::AccountId).big_integer().not_null())
          .col(ColumnDef::new(Bookings::TourDateId).big_integer().not_null())
          .col(
            ColumnDef::new(Bookings::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(Bookings::PlatformFee).big_integer().not_null())
          .col(ColumnDef::new(Bookings::TotalAmount).big_integer().not_null())
          .col(ColumnDef::new(Bookings::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Bookings::ConfirmedAt).date_time().null())
          .col(ColumnDef::new(Bookings::CancelledAt).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_bookings_account")
              .from(Bookings::Table, Bookings::AccountId)
              .to(Accounts::Table, Accounts::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_bookings_tour_date")
              .from(Bookings::Table, Bookings::TourDateId)
              .to(TourDates::Table, TourDates::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_bookings_status_created")
          .table(Bookings::Table)
          .col(Bookings::Status)
          .col(Bookings::CreatedAt)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_bookings_account")
          .table(Bookings::Table)
          .col(Bookings::AccountId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Bookings::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Bookings {
  Table,
  Id,
  AccountId,
  TourDateId,
  Status,
  PlatformFee,
  TotalAmount,
  CreatedAt,
  ConfirmedAt,
  CancelledAt,
}
