use sea_orm_migration::prelude::*;

use super::m20260823_000001_create_accounts::Accounts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(TourDates::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(TourDates::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(TourDates::SupplierId).big_integer().not_null())
          .col(ColumnDef::new(TourDates::Title).string().not_null())
          .col(ColumnDef::new(TourDates::DepartsOn).date().not_null())
          .col(
            ColumnDef::new(TourDates::PricePerSeat).big_integer().not_null(),
          )
          .col(ColumnDef::new(TourDates::SeatCount).integer().not_null())
          .col(ColumnDef::new(TourDates::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_tour_dates_supplier")
              .from(TourDates::Table, TourDates::SupplierId)
              .to(Accounts::Table, Accounts::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_tour_dates_supplier")
          .table(TourDates::Table)
          .col(TourDates::SupplierId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(TourDates::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum TourDates {
  Table,
  Id,
  SupplierId,
  Title,
  DepartsOn,
  PricePerSeat,
  SeatCount,
  CreatedAt,
}
