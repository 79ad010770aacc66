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
          .table(Withdrawals::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Withdrawals::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Withdrawals::ResellerId).big_integer().not_null(),
          )
          .col(ColumnDef::new(Withdrawals::Amount).big_integer().not_null())
          .col(
            ColumnDef::new(Withdrawals::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(Withdrawals::ApprovedBy).big_integer().null())
          .col(ColumnDef::new(Withdrawals::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Withdrawals::DecidedAt).date_time().null())
          .col(ColumnDef::new(Withdrawals::CompletedAt).date_time().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_withdrawals_reseller")
              .from(Withdrawals::Table, Withdrawals::ResellerId)
              .to(Accounts::Table, Accounts::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_withdrawals_approver")
              .from(Withdrawals::Table, Withdrawals::ApprovedBy)
              .to(Accounts::Table, Accounts::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_withdrawals_reseller_status")
          .table(Withdrawals::Table)
          .col(Withdrawals::ResellerId)
          .col(Withdrawals::Status)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_withdrawals_created")
          .table(Withdrawals::Table)
          .col(Withdrawals::CreatedAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Withdrawals::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Withdrawals {
  Table,
  Id,
  ResellerId,
  Amount,
  Status,
  ApprovedBy,
  CreatedAt,
  DecidedAt,
  CompletedAt,
}
