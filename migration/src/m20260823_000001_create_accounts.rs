use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Accounts::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Accounts::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Accounts::DisplayName).string().not_null())
          .col(
            ColumnDef::new(Accounts::Role)
              .string()
              .not_null()
              .default("customer"),
          )
          .col(
            ColumnDef::new(Accounts::ReferralCode)
              .string()
              .null()
              .unique_key(),
          )
          .col(ColumnDef::new(Accounts::SponsorId).big_integer().null())
          .col(ColumnDef::new(Accounts::GroupRootId).big_integer().not_null())
          .col(
            ColumnDef::new(Accounts::BaseCommission)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Accounts::UplineCommission)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Accounts::BankName).string().null())
          .col(ColumnDef::new(Accounts::BankAccount).string().null())
          .col(
            ColumnDef::new(Accounts::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(Accounts::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_accounts_sponsor")
              .from(Accounts::Table, Accounts::SponsorId)
              .to(Accounts::Table, Accounts::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_accounts_sponsor")
          .table(Accounts::Table)
          .col(Accounts::SponsorId)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_accounts_group_root")
          .table(Accounts::Table)
          .col(Accounts::GroupRootId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Accounts::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Accounts {
  Table,
  Id,
  DisplayName,
  Role,
  ReferralCode,
  SponsorId,
  GroupRootId,
  BaseCommission,
  UplineCommission,
  BankName,
  BankAccount,
  IsActive,
  CreatedAt,
}
