use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::account;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum WithdrawalStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "approved")]
  Approved,
  #[sea_orm(string_value = "rejected")]
  Rejected,
  #[sea_orm(string_value = "completed")]
  Completed,
}

impl WithdrawalStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      WithdrawalStatus::Pending => "pending",
      WithdrawalStatus::Approved => "approved",
      WithdrawalStatus::Rejected => "rejected",
      WithdrawalStatus::Completed => "completed",
    }
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub reseller_id: i64,
  pub amount: i64,
  pub status: WithdrawalStatus,
  pub approved_by: Option<i64>,
  pub created_at: DateTime,
  pub decided_at: Option<DateTime>,
  pub completed_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "account::Entity",
    from = "Column::ResellerId",
    to = "account::Column::Id"
  )]
  Reseller,
  #[sea_orm(
    belongs_to = "account::Entity",
    from = "Column::ApprovedBy",
    to = "account::Column::Id"
  )]
  Approver,
}

impl Related<account::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Reseller.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
