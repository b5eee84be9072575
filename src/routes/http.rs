//! Public HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented; results are logged inside `logic`.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::instrument;

use crate::domain::{Category, GameRecord, QuizStats, SubmittedAnswer};
use crate::error::AppError;
use crate::logic;
use crate::protocol::*;
use crate::routes::JsonBody;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

pub async fn http_categories() -> Json<Vec<CategoryOut>> {
  Json(logic::list_categories())
}

#[instrument(level = "info", skip(state))]
pub async fn http_category_questions(
  State(state): State<Arc<AppState>>,
  Path(category): Path<String>,
) -> Result<Json<Vec<QuestionOut>>, AppError> {
  let category: Category = category.parse()?;
  Ok(Json(logic::category_questions(&state, category).await?))
}

#[instrument(level = "info", skip(state, body), fields(question_id = body.question_id))]
pub async fn http_post_grade(
  State(state): State<Arc<AppState>>,
  JsonBody(body): JsonBody<GradeIn>,
) -> Result<Json<GradeOut>, AppError> {
  Ok(Json(logic::grade_once(&state, body.question_id, body.answer).await?))
}

#[instrument(level = "info", skip(state, body), fields(category = %body.category))]
pub async fn http_start_game(
  State(state): State<Arc<AppState>>,
  JsonBody(body): JsonBody<StartGameIn>,
) -> Result<(StatusCode, Json<GameOut>), AppError> {
  let game = logic::start_game(&state, body.category).await?;
  Ok((StatusCode::CREATED, Json(game)))
}

#[instrument(level = "debug", skip(state))]
pub async fn http_get_game(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<GameOut>, AppError> {
  Ok(Json(logic::game_view(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_abandon_game(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
  logic::abandon_game(&state, &id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state, answer))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  JsonBody(answer): JsonBody<SubmittedAnswer>,
) -> Result<Json<AnswerOut>, AppError> {
  Ok(Json(logic::submit_answer(&state, &id, answer).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_hint(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<HintOut>, AppError> {
  Ok(Json(logic::reveal_hint(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_complete_game(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<SummaryOut>, AppError> {
  Ok(Json(logic::complete_game(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_stats(State(state): State<Arc<AppState>>) -> Result<Json<QuizStats>, AppError> {
  Ok(Json(logic::stats(&state).await?))
}

#[instrument(level = "info", skip(state), fields(limit = ?q.limit))]
pub async fn http_history(
  State(state): State<Arc<AppState>>,
  Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<GameRecord>>, AppError> {
  Ok(Json(logic::history(&state, q.limit).await?))
}
