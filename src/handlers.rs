use axum::{
  Json,
  extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{account, booking, commission, tour_date, withdrawal},
  prelude::*,
  state::AppState,
  sv,
  sv::inventory::SeatRequest,
};

pub async fn health() -> Json<json::Value> {
  Json(json::json!({ "status": "ok" }))
}

#[derive(Deserialize)]
pub struct RegisterReseller {
  pub display_name: String,
  pub base_commission: i64,
  pub upline_commission: i64,
  pub sponsor_code: Option<String>,
}

pub async fn register_reseller(
  State(app): State<Arc<AppState>>,
  Json(req): Json<RegisterReseller>,
) -> Result<Json<account::Model>> {
  let account = sv::Accounts::new(&app.db)
    .register_reseller(
      &req.display_name,
      req.base_commission,
      req.upline_commission,
      req.sponsor_code.as_deref(),
    )
    .await?;
  Ok(Json(account))
}

#[derive(Deserialize)]
pub struct BankDetails {
  pub bank_name: String,
  pub bank_account: String,
}

pub async fn set_bank_details(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
  Json(req): Json<BankDetails>,
) -> Result<Json<json::Value>> {
  sv::Accounts::new(&app.db)
    .set_bank_details(id, &req.bank_name, &req.bank_account)
    .await?;
  Ok(Json(json::json!({ "updated": true })))
}

#[derive(Deserialize)]
pub struct HistoryParams {
  #[serde(default = "default_limit")]
  pub limit: u64,
}

fn default_limit() -> u64 {
  50
}

#[derive(Deserialize)]
pub struct CreateTourDate {
  pub supplier_id: i64,
  pub title: String,
  pub departs_on: NaiveDate,
  pub price_per_seat: i64,
  pub seat_count: i32,
}

pub async fn create_tour_date(
  State(app): State<Arc<AppState>>,
  Json(req): Json<CreateTourDate>,
) -> Result<Json<tour_date::Model>> {
  let tour = sv::Inventory::new(&app.db)
    .create_tour_date(
      req.supplier_id,
      &req.title,
      req.departs_on,
      req.price_per_seat,
      req.seat_count,
    )
    .await?;
  Ok(Json(tour))
}

#[derive(Deserialize)]
pub struct CreateBooking {
  pub account_id: i64,
  pub tour_date_id: i64,
  pub seats: Vec<SeatRequest>,
}

pub async fn create_booking(
  State(app): State<Arc<AppState>>,
  Json(req): Json<CreateBooking>,
) -> Result<Json<booking::Model>> {
  let booking = app
    .ledger()
    .create(
      req.account_id,
      req.tour_date_id,
      &req.seats,
      app.config.platform_fee,
    )
    .await?;
  Ok(Json(booking))
}

pub async fn booking_history(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<booking::Model>>> {
  Ok(Json(app.ledger().history(id, params.limit).await?))
}

pub async fn commission_history(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<commission::Model>>> {
  Ok(Json(sv::Commission::new(&app.db).history(id, params.limit).await?))
}

pub async fn withdrawal_history(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<withdrawal::Model>>> {
  Ok(Json(app.withdrawals().history(id, params.limit).await?))
}

pub async fn confirm_booking(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
) -> Result<Json<booking::Model>> {
  Ok(Json(app.ledger().confirm(id).await?))
}

pub async fn cancel_booking(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
) -> Result<Json<booking::Model>> {
  Ok(Json(app.ledger().cancel(id).await?))
}

#[derive(Serialize)]
pub struct BalanceView {
  pub total_earned: i64,
  pub total_withdrawn: i64,
  pub pending: i64,
  pub available: i64,
}

pub async fn balance(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
) -> Result<Json<BalanceView>> {
  let sv = app.withdrawals();
  Ok(Json(BalanceView {
    total_earned: sv.total_earned(id).await?,
    total_withdrawn: sv.total_withdrawn(id).await?,
    pending: sv.pending_total(id).await?,
    available: sv.available_balance(id).await?,
  }))
}

#[derive(Deserialize)]
pub struct RequestWithdrawal {
  pub reseller_id: i64,
  pub amount: i64,
}

pub async fn request_withdrawal(
  State(app): State<Arc<AppState>>,
  Json(req): Json<RequestWithdrawal>,
) -> Result<Json<withdrawal::Model>> {
  Ok(Json(app.withdrawals().request(req.reseller_id, req.amount).await?))
}

#[derive(Deserialize)]
pub struct Decision {
  pub approver_id: i64,
}

pub async fn approve_withdrawal(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
  Json(req): Json<Decision>,
) -> Result<Json<withdrawal::Model>> {
  Ok(Json(app.withdrawals().approve(id, req.approver_id).await?))
}

pub async fn reject_withdrawal(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
  Json(req): Json<Decision>,
) -> Result<Json<withdrawal::Model>> {
  Ok(Json(app.withdrawals().reject(id, req.approver_id).await?))
}

pub async fn complete_withdrawal(
  State(app): State<Arc<AppState>>,
  Path(id): Path<i64>,
) -> Result<Json<withdrawal::Model>> {
  Ok(Json(app.withdrawals().complete(id).await?))
}

pub async fn reconcile_roots(
  State(app): State<Arc<AppState>>,
) -> Result<Json<json::Value>> {
  let fixed = sv::Referral::new(&app.db).reconcile_roots().await?;
  Ok(Json(json::json!({ "fixed": fixed })))
}
