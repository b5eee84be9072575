//! Admin endpoints. Everything except login needs `Authorization: Bearer <token>`.

use std::sync::Arc;

use axum::{
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  Json,
};
use tracing::instrument;

use crate::domain::{Question, QuestionDraft};
use crate::error::AppError;
use crate::logic;
use crate::protocol::*;
use crate::routes::JsonBody;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
pub async fn http_login(
  State(state): State<Arc<AppState>>,
  JsonBody(body): JsonBody<LoginIn>,
) -> Result<Json<LoginOut>, AppError> {
  Ok(Json(logic::admin_login(&state, &body.password).await?))
}

#[instrument(level = "info", skip_all)]
pub async fn http_logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<OkOut>, AppError> {
  let token = state.admin.require(&headers).await?;
  logic::admin_logout(&state, &token).await;
  Ok(Json(OkOut { ok: true }))
}

#[instrument(level = "info", skip_all)]
pub async fn http_list_questions(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Result<Json<Vec<Question>>, AppError> {
  state.admin.require(&headers).await?;
  Ok(Json(logic::admin_questions(&state).await?))
}

#[instrument(level = "info", skip_all)]
pub async fn http_create_question(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  JsonBody(draft): JsonBody<QuestionDraft>,
) -> Result<(StatusCode, Json<Question>), AppError> {
  state.admin.require(&headers).await?;
  let q = logic::admin_create_question(&state, draft).await?;
  Ok((StatusCode::CREATED, Json(q)))
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_delete_question(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
  state.admin.require(&headers).await?;
  logic::admin_delete_question(&state, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip_all)]
pub async fn http_generate_question(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  JsonBody(body): JsonBody<GenerateIn>,
) -> Result<Json<GenerateOut>, AppError> {
  state.admin.require(&headers).await?;
  Ok(Json(logic::admin_generate_question(&state, body).await?))
}
