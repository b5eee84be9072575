//! Domain models: categories, questions (tagged by kind), submitted answers,
//! game/answer records and aggregate statistics.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Quiz categories offered on the home screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  General,
  History,
  Science,
}

impl Category {
  pub const ALL: [Category; 3] = [Category::General, Category::History, Category::Science];

  pub fn as_str(&self) -> &'static str {
    match self {
      Category::General => "general",
      Category::History => "history",
      Category::Science => "science",
    }
  }

  pub fn display_name(&self) -> &'static str {
    match self {
      Category::General => "일반상식",
      Category::History => "역사",
      Category::Science => "과학",
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      Category::General => "일상생활과 기본 지식",
      Category::History => "세계사와 한국사",
      Category::Science => "물리, 화학, 생물학",
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Category {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Category::ALL
      .into_iter()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| AppError::BadRequest(format!("Invalid category: {}", s)))
  }
}

/// Question kind without payload; used by config entries and generation requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
  #[default]
  MultipleChoice,
  FillBlank,
}

/// Kind-specific payload of a question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionBody {
  MultipleChoice {
    options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    correct_index: usize,
  },
  FillBlank {
    #[serde(rename = "correctAnswers")]
    accepted_answers: Vec<String>,
    #[serde(default)]
    hints: Vec<String>,
  },
}

impl QuestionBody {
  pub fn kind(&self) -> QuestionKind {
    match self {
      QuestionBody::MultipleChoice { .. } => QuestionKind::MultipleChoice,
      QuestionBody::FillBlank { .. } => QuestionKind::FillBlank,
    }
  }

  pub fn validate(&self) -> Result<(), String> {
    match self {
      QuestionBody::MultipleChoice { options, correct_index } => {
        if options.len() < 2 {
          return Err("multiple choice needs at least two options".into());
        }
        if options.iter().any(|o| o.trim().is_empty()) {
          return Err("options must not be blank".into());
        }
        if *correct_index >= options.len() {
          return Err(format!("correctAnswer {} out of range for {} options", correct_index, options.len()));
        }
        Ok(())
      }
      QuestionBody::FillBlank { accepted_answers, .. } => {
        if !accepted_answers.iter().any(|a| !a.trim().is_empty()) {
          return Err("fill blank needs at least one accepted answer".into());
        }
        Ok(())
      }
    }
  }
}

/// A question that has not been stored yet (admin input, config bank, LLM output).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionDraft {
  pub category: Category,
  pub question: String,
  #[serde(flatten)]
  pub body: QuestionBody,
}

impl QuestionDraft {
  pub fn validate(&self) -> Result<(), String> {
    if self.question.trim().is_empty() {
      return Err("question text must not be blank".into());
    }
    self.body.validate()
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub id: u64,
  pub category: Category,
  pub question: String,
  #[serde(flatten)]
  pub body: QuestionBody,
}

impl Question {
  pub fn from_draft(id: u64, d: QuestionDraft) -> Self {
    Self { id, category: d.category, question: d.question, body: d.body }
  }

  /// Text shown as the expected answer after judging.
  pub fn expected_answer(&self) -> String {
    match &self.body {
      QuestionBody::MultipleChoice { options, correct_index } => {
        options.get(*correct_index).cloned().unwrap_or_default()
      }
      QuestionBody::FillBlank { accepted_answers, .. } => {
        accepted_answers.first().cloned().unwrap_or_default()
      }
    }
  }
}

/// What a player sent for one question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmittedAnswer {
  Choice { index: usize },
  Text { text: String },
  Timeout,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameRecord {
  pub category: Category,
  pub score: u32,
  pub total_questions: u32,
  pub time_spent: u64,
  pub accuracy: u32,
  pub points: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
  pub id: u64,
  pub category: Category,
  pub score: u32,
  pub total_questions: u32,
  pub time_spent: u64,
  pub accuracy: u32,
  pub points: u32,
  pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnswerRecord {
  pub question_id: u64,
  pub answer: SubmittedAnswer,
  pub is_correct: bool,
  pub points: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
  pub id: u64,
  pub game_id: u64,
  pub question_id: u64,
  pub answer: SubmittedAnswer,
  pub is_correct: bool,
  pub points: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BestScores {
  pub general: u32,
  pub history: u32,
  pub science: u32,
}

impl BestScores {
  pub fn set(&mut self, category: Category, score: u32) {
    match category {
      Category::General => self.general = score,
      Category::History => self.history = score,
      Category::Science => self.science = score,
    }
  }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStats {
  pub best_score: u32,
  pub average_score: u32,
  pub total_games: usize,
  pub best_scores: BestScores,
}
