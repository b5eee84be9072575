//! Core behaviors behind the HTTP handlers.
//!
//! This includes:
//!   - Category listing and public question lists
//!   - Game sessions: start, view, answer, hint, complete, abandon
//!   - One-off grading of a single answer
//!   - History and statistics
//!   - Admin: login/logout, question CRUD, LLM question generation

use std::time::Instant;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Category, GameRecord, Question, QuestionDraft, QuizStats, SubmittedAnswer};
use crate::error::AppError;
use crate::protocol::*;
use crate::session::{judge, GameSession, Judgement};
use crate::state::AppState;
use crate::util::trunc_for_log;

pub fn list_categories() -> Vec<CategoryOut> {
  Category::ALL
    .iter()
    .map(|c| CategoryOut { id: *c, name: c.display_name(), description: c.description() })
    .collect()
}

#[instrument(level = "info", skip(state))]
pub async fn category_questions(state: &AppState, category: Category) -> Result<Vec<QuestionOut>, AppError> {
  let qs = state.store.questions_by_category(category).await?;
  Ok(qs.iter().map(QuestionOut::from).collect())
}

fn parse_game_id(id: &str) -> Result<Uuid, AppError> {
  Uuid::parse_str(id).map_err(|_| AppError::BadRequest(format!("Invalid game id: {}", id)))
}

fn game_out(state: &AppState, s: &GameSession, now: Instant) -> GameOut {
  let limits = state.time_limits();
  GameOut {
    game_id: s.id.to_string(),
    category: s.category,
    index: s.index(),
    total_questions: s.questions.len(),
    score: s.correct_count(),
    points: s.points(),
    finished: s.is_finished(),
    seconds_per_question: state.settings.seconds_per_question,
    seconds_remaining: if s.is_finished() { 0 } else { s.seconds_remaining(now, &limits) },
    question: s.current().map(QuestionOut::from),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn start_game(state: &AppState, category: Category) -> Result<GameOut, AppError> {
  let now = Instant::now();
  let pruned = state.prune_sessions(now).await;
  if pruned > 0 {
    debug!(target: "quiz", pruned, "Expired sessions dropped");
  }

  let mut questions = state.store.questions_by_category(category).await?;
  questions.truncate(state.settings.questions_per_game);
  if questions.is_empty() {
    return Err(AppError::NotFound(format!("No questions for category {}", category)));
  }

  let session = GameSession::new(category, questions, now);
  let out = game_out(state, &session, now);
  info!(target: "quiz", %category, game_id = %session.id, total = session.questions.len(), "Game started");
  state.sessions.write().await.insert(session.id, session);
  Ok(out)
}

#[instrument(level = "debug", skip(state))]
pub async fn game_view(state: &AppState, game_id: &str) -> Result<GameOut, AppError> {
  let id = parse_game_id(game_id)?;
  let sessions = state.sessions.read().await;
  let s = sessions.get(&id).ok_or_else(|| AppError::NotFound(format!("Unknown game: {}", game_id)))?;
  Ok(game_out(state, s, Instant::now()))
}

#[instrument(level = "info", skip(state, answer), fields(kind = answer_kind(&answer)))]
pub async fn submit_answer(state: &AppState, game_id: &str, answer: SubmittedAnswer) -> Result<AnswerOut, AppError> {
  let id = parse_game_id(game_id)?;
  let now = Instant::now();
  let limits = state.time_limits();

  let mut sessions = state.sessions.write().await;
  let s = sessions.get_mut(&id).ok_or_else(|| AppError::NotFound(format!("Unknown game: {}", game_id)))?;
  let judgement = s.submit(answer, now, &limits, &state.grading)?;

  match &judgement {
    Some(j) => info!(
      target: "quiz",
      %game_id, question_id = j.question_id, correct = j.is_correct, points = j.points, verdict = ?j.verdict,
      "Answer judged"
    ),
    None => debug!(target: "quiz", %game_id, "Blank answer, not graded"),
  }

  Ok(AnswerOut {
    graded: judgement.is_some(),
    result: judgement.as_ref().map(JudgementOut::from),
    game: game_out(state, s, now),
  })
}

fn answer_kind(a: &SubmittedAnswer) -> &'static str {
  match a {
    SubmittedAnswer::Choice { .. } => "choice",
    SubmittedAnswer::Text { .. } => "text",
    SubmittedAnswer::Timeout => "timeout",
  }
}

#[instrument(level = "info", skip(state))]
pub async fn reveal_hint(state: &AppState, game_id: &str) -> Result<HintOut, AppError> {
  let id = parse_game_id(game_id)?;
  let mut sessions = state.sessions.write().await;
  let s = sessions.get_mut(&id).ok_or_else(|| AppError::NotFound(format!("Unknown game: {}", game_id)))?;
  let hint = s.next_hint()?;
  Ok(HintOut { text: hint.text, remaining: hint.remaining })
}

/// Persist a finished game and return its review. The session is taken out
/// first so a double submit cannot record the game twice; it is put back if
/// the game is unfinished or the store fails.
#[instrument(level = "info", skip(state))]
pub async fn complete_game(state: &AppState, game_id: &str) -> Result<SummaryOut, AppError> {
  let id = parse_game_id(game_id)?;
  let now = Instant::now();

  let session = state
    .sessions
    .write()
    .await
    .remove(&id)
    .ok_or_else(|| AppError::NotFound(format!("Unknown game: {}", game_id)))?;

  let saved = match session.summary(now) {
    Ok(summary) => state.store.save_game(summary.record, summary.answers).await,
    Err(e) => Err(e),
  };
  let record = match saved {
    Ok(r) => r,
    Err(e) => {
      state.sessions.write().await.insert(id, session);
      return Err(e);
    }
  };

  info!(
    target: "quiz",
    %game_id, record_id = record.id, category = %record.category, score = record.score,
    total = record.total_questions, accuracy = record.accuracy, "Game completed"
  );

  let answers = session
    .answers
    .iter()
    .zip(session.questions.iter())
    .map(|(j, q)| review_item(q, j))
    .collect();
  Ok(SummaryOut { game: record, answers })
}

fn review_item(q: &Question, j: &Judgement) -> ReviewItem {
  ReviewItem {
    question_id: q.id,
    question: q.question.clone(),
    answer: j.answer.clone(),
    expected: j.expected.clone(),
    correct: j.is_correct,
    points: j.points,
    verdict: j.verdict,
  }
}

#[instrument(level = "info", skip(state))]
pub async fn abandon_game(state: &AppState, game_id: &str) -> Result<(), AppError> {
  let id = parse_game_id(game_id)?;
  match state.sessions.write().await.remove(&id) {
    Some(_) => Ok(()),
    None => Err(AppError::NotFound(format!("Unknown game: {}", game_id))),
  }
}

/// Judge one answer without a session or timer.
#[instrument(level = "info", skip(state, answer), fields(kind = answer_kind(&answer)))]
pub async fn grade_once(state: &AppState, question_id: u64, answer: SubmittedAnswer) -> Result<GradeOut, AppError> {
  let q = state
    .store
    .get_question(question_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Unknown question: {}", question_id)))?;
  let j = judge(&q, &answer, &state.grading)?;
  Ok(GradeOut { graded: j.is_some(), result: j.as_ref().map(JudgementOut::from) })
}

pub async fn stats(state: &AppState) -> Result<QuizStats, AppError> {
  state.store.stats().await
}

pub async fn history(state: &AppState, limit: Option<usize>) -> Result<Vec<GameRecord>, AppError> {
  let limit = limit
    .unwrap_or(state.settings.history_limit)
    .clamp(1, state.settings.max_history_limit.max(1));
  state.store.game_history(limit).await
}

// -------- Admin --------

pub async fn admin_login(state: &AppState, password: &str) -> Result<LoginOut, AppError> {
  let token = state.admin.login(password).await?;
  Ok(LoginOut { token })
}

pub async fn admin_logout(state: &AppState, token: &str) {
  state.admin.logout(token).await;
}

pub async fn admin_questions(state: &AppState) -> Result<Vec<Question>, AppError> {
  state.store.all_questions().await
}

#[instrument(level = "info", skip(state, draft), fields(category = %draft.category))]
pub async fn admin_create_question(state: &AppState, draft: QuestionDraft) -> Result<Question, AppError> {
  draft.validate().map_err(AppError::BadRequest)?;
  let q = state.store.insert_question(draft).await?;
  info!(target: "quiz", id = q.id, question = %trunc_for_log(&q.question, 40), "Admin created question");
  Ok(q)
}

#[instrument(level = "info", skip(state))]
pub async fn admin_delete_question(state: &AppState, id: u64) -> Result<(), AppError> {
  if state.store.delete_question(id).await? {
    info!(target: "quiz", id, "Admin deleted question");
    Ok(())
  } else {
    Err(AppError::NotFound(format!("Unknown question: {}", id)))
  }
}

#[instrument(level = "info", skip(state, req), fields(category = %req.category, kind = ?req.kind, save = req.save))]
pub async fn admin_generate_question(state: &AppState, req: GenerateIn) -> Result<GenerateOut, AppError> {
  let Some(oa) = &state.openai else {
    warn!(target: "quiz", "Generation requested but OPENAI_API_KEY is not set");
    return Err(AppError::Unavailable("Question generation is not configured (OPENAI_API_KEY)".into()));
  };

  let existing: Vec<String> = state
    .store
    .questions_by_category(req.category)
    .await?
    .into_iter()
    .map(|q| q.question)
    .collect();

  let draft = oa.generate_question(&state.prompts, req.category, req.kind, &existing).await?;
  let saved = if req.save {
    Some(state.store.insert_question(draft.clone()).await?)
  } else {
    None
  };
  Ok(GenerateOut { draft, saved })
}
