//! Application error type and its HTTP mapping.
//!
//! Handlers return `Result<Json<T>, AppError>`; the error renders as
//! `{"error": "..."}` with a status code matching the variant.

use axum::{
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::openai::GenerateError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("unauthorized")]
  Unauthorized,

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  Unavailable(String),

  #[error("question generation failed: {0}")]
  Upstream(#[from] GenerateError),

  #[error("storage error: {0}")]
  Storage(String),
}

impl AppError {
  pub fn status(&self) -> StatusCode {
    match self {
      AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Unauthorized => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
      AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<JsonRejection> for AppError {
  fn from(rejection: JsonRejection) -> Self {
    AppError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = self.to_string();
    if status.is_server_error() {
      error!(target: "quiz_backend", %status, error = %message, "Request failed");
    } else {
      warn!(target: "quiz_backend", %status, error = %message, "Request rejected");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
