//! Public request/response structs for the HTTP API (serde ready, camelCase).
//! Keep this small and stable so backend and front-end can evolve independently.

use serde::{Deserialize, Serialize};

use crate::domain::{
  Category, GameRecord, Question, QuestionBody, QuestionDraft, QuestionKind, SubmittedAnswer,
};
use crate::session::{Judgement, Verdict};

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct CategoryOut {
  pub id: Category,
  pub name: &'static str,
  pub description: &'static str,
}

/// Question as shown to players: no correct answers, hints only as a count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOut {
  pub id: u64,
  pub category: Category,
  pub question: String,
  #[serde(rename = "type")]
  pub kind: QuestionKind,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub options: Option<Vec<String>>,
  pub hint_count: usize,
}

impl From<&Question> for QuestionOut {
  fn from(q: &Question) -> Self {
    let (options, hint_count) = match &q.body {
      QuestionBody::MultipleChoice { options, .. } => (Some(options.clone()), 0),
      QuestionBody::FillBlank { hints, .. } => (None, hints.len()),
    };
    Self {
      id: q.id,
      category: q.category,
      question: q.question.clone(),
      kind: q.body.kind(),
      options,
      hint_count,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct StartGameIn {
  pub category: Category,
}

/// Snapshot of a running game, including the question currently on the clock.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOut {
  pub game_id: String,
  pub category: Category,
  pub index: usize,
  pub total_questions: usize,
  pub score: u32,
  pub points: u32,
  pub finished: bool,
  pub seconds_per_question: u64,
  pub seconds_remaining: u64,
  pub question: Option<QuestionOut>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgementOut {
  pub question_id: u64,
  pub correct: bool,
  pub points: u32,
  pub verdict: Verdict,
  pub expected: String,
}

impl From<&Judgement> for JudgementOut {
  fn from(j: &Judgement) -> Self {
    Self {
      question_id: j.question_id,
      correct: j.is_correct,
      points: j.points,
      verdict: j.verdict,
      expected: j.expected.clone(),
    }
  }
}

/// Reply to an answer submission. `graded = false` means the text was blank:
/// nothing was recorded and the same question is still current.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
  pub graded: bool,
  pub result: Option<JudgementOut>,
  pub game: GameOut,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeIn {
  pub question_id: u64,
  pub answer: SubmittedAnswer,
}

#[derive(Debug, Serialize)]
pub struct GradeOut {
  pub graded: bool,
  pub result: Option<JudgementOut>,
}

#[derive(Debug, Serialize)]
pub struct HintOut {
  pub text: Option<String>,
  pub remaining: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewItem {
  pub question_id: u64,
  pub question: String,
  pub answer: SubmittedAnswer,
  pub expected: String,
  pub correct: bool,
  pub points: u32,
  pub verdict: Verdict,
}

#[derive(Debug, Serialize)]
pub struct SummaryOut {
  pub game: GameRecord,
  pub answers: Vec<ReviewItem>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
  pub limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct LoginIn {
  pub password: String,
}

#[derive(Serialize)]
pub struct LoginOut {
  pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateIn {
  pub category: Category,
  #[serde(default)]
  pub kind: QuestionKind,
  /// Store the generated question right away instead of returning a draft.
  #[serde(default)]
  pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateOut {
  pub draft: QuestionDraft,
  pub saved: Option<Question>,
}

#[derive(Serialize)]
pub struct OkOut {
  pub ok: bool,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn public_view_hides_answers() {
    let q = Question {
      id: 3,
      category: Category::History,
      question: "임진왜란 때 거북선을 이끈 장군은 ______ 이다.".into(),
      body: QuestionBody::FillBlank { accepted_answers: vec!["이순신".into()], hints: vec!["백 원".into()] },
    };
    let v = serde_json::to_value(QuestionOut::from(&q)).unwrap();
    assert_eq!(v["type"], "fill_blank");
    assert_eq!(v["hintCount"], 1);
    assert!(v.get("options").is_none());
    assert!(!v.to_string().contains("이순신"));
  }
}
