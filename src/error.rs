use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("account not found")]
  AccountNotFound,
  #[error("tour date not found")]
  TourDateNotFound,
  #[error("booking not found")]
  BookingNotFound,
  #[error("withdrawal not found")]
  WithdrawalNotFound,
  #[error("sponsor assignment would create a referral cycle")]
  CyclicReferral,
  #[error("seats unavailable: {0:?}")]
  SeatUnavailable(Vec<i32>),
  #[error("duplicate seats in request: {0:?}")]
  DuplicateSeatRequest(Vec<i32>),
  #[error("invalid transition from {from} to {to}")]
  InvalidTransition { from: &'static str, to: &'static str },
  #[error("commission already accrued for booking {0}")]
  DuplicateAccrual(i64),
  #[error("insufficient balance, {available} available")]
  InsufficientBalance { available: i64 },
  #[error("operation not permitted for this role")]
  RoleNotPermitted,
  #[error("invalid arguments: {0}")]
  InvalidArgs(String),
  #[error(transparent)]
  Db(#[from] sea_orm::DbErr),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::AccountNotFound
      | Error::TourDateNotFound
      | Error::BookingNotFound
      | Error::WithdrawalNotFound => StatusCode::NOT_FOUND,
      Error::CyclicReferral
      | Error::DuplicateSeatRequest(_)
      | Error::InvalidArgs(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Error::SeatUnavailable(_)
      | Error::InvalidTransition { .. }
      | Error::InsufficientBalance { .. } => StatusCode::CONFLICT,
      Error::RoleNotPermitted => StatusCode::FORBIDDEN,
      // an accrual guard trip means the confirm transaction boundary is
      // broken, so it is not reported as a client conflict
      Error::DuplicateAccrual(_) | Error::Db(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };

    let mut body = json!({ "error": self.to_string() });
    match &self {
      Error::SeatUnavailable(seats) | Error::DuplicateSeatRequest(seats) => {
        body["seats"] = json!(seats);
      }
      Error::InvalidTransition { from, to } => {
        body["from"] = json!(from);
        body["to"] = json!(to);
      }
      Error::InsufficientBalance { available } => {
        body["available"] = json!(available);
      }
      _ => {}
    }

    (status, Json(body)).into_response()
  }
}
