use sea_orm_migration::prelude::*;

use super::{
  m20260823_000001_create_accounts::Accounts,
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
          .table(Commissions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Commissions::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Commissions::BookingId).big_integer().not_null())
          .col(
            ColumnDef::new(Commissions::ResellerId).big_integer().not_null(),
          )
          .col(ColumnDef::new(Commissions::Level).integer().not_null())
          .col(ColumnDef::new(Commissions::Amount).big_integer().not_null())
          .col(ColumnDef::new(Commissions::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_commissions_booking")
              .from(Commissions::Table, Commissions::BookingId)
              .to(Bookings::Table, Bookings::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_commissions_reseller")
              .from(Commissions::Table, Commissions::ResellerId)
              .to(Accounts::Table, Accounts::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    // one record per (booking, reseller), enforced by the store as well
    // as by the accrual guard
    manager
      .create_index(
        Index::create()
          .name("uq_commissions_booking_reseller")
          .table(Commissions::Table)
          .col(Commissions::BookingId)
          .col(Commissions::ResellerId)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_commissions_reseller_created")
          .table(Commissions::Table)
          .col(Commissions::ResellerId)
          .col(Commissions::CreatedAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Commissions::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Commissions {
  Table,
  Id,
  BookingId,
  ResellerId,
  Level,
  Amount,
  CreatedAt,
}
