//! Loading service configuration (game settings, grading policy, generation
//! prompts, optional question bank) from TOML.
//!
//! Every section is optional; see `AppConfig` for the schema.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Category, QuestionBody, QuestionDraft, QuestionKind};
use crate::grading::GradingPolicy;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub game: GameSettings,
  #[serde(default)]
  pub grading: GradingPolicy,
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// Game flow limits.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameSettings {
  pub questions_per_game: usize,
  pub seconds_per_question: u64,
  /// Extra seconds accepted after the timer for network latency.
  pub answer_grace_secs: u64,
  pub history_limit: usize,
  pub max_history_limit: usize,
  /// Unfinished sessions older than this are dropped.
  pub session_ttl_secs: u64,
}

impl Default for GameSettings {
  fn default() -> Self {
    Self {
      questions_per_game: 10,
      seconds_per_question: 30,
      answer_grace_secs: 2,
      history_limit: 5,
      max_history_limit: 50,
      session_ttl_secs: 3600,
    }
  }
}

/// Question bank entry accepted in TOML. Fields for the other kind are ignored;
/// `resolve` turns the entry into a typed draft.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub category: Category,
  pub question: String,
  #[serde(default)]
  pub kind: Option<QuestionKind>,
  // multiple_choice
  #[serde(default)]
  pub options: Option<Vec<String>>,
  #[serde(default)]
  pub correct_answer: Option<usize>,
  // fill_blank
  #[serde(default)]
  pub correct_answers: Option<Vec<String>>,
  #[serde(default)]
  pub hints: Option<Vec<String>>,
}

impl QuestionCfg {
  pub fn resolve(&self) -> Result<QuestionDraft, String> {
    let kind = self.kind.unwrap_or(if self.correct_answers.is_some() {
      QuestionKind::FillBlank
    } else {
      QuestionKind::MultipleChoice
    });

    let body = match kind {
      QuestionKind::MultipleChoice => QuestionBody::MultipleChoice {
        options: self.options.clone().ok_or("missing options")?,
        correct_index: self.correct_answer.ok_or("missing correct_answer")?,
      },
      QuestionKind::FillBlank => QuestionBody::FillBlank {
        accepted_answers: self.correct_answers.clone().ok_or("missing correct_answers")?,
        hints: self.hints.clone().unwrap_or_default(),
      },
    };

    let draft = QuestionDraft { category: self.category, question: self.question.clone(), body };
    draft.validate()?;
    Ok(draft)
  }
}

/// Prompts used for question generation. `{existing}` in `avoid_duplicates_template`
/// is replaced by a numbered list of questions already in the bank.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub multiple_choice_system: String,
  pub fill_blank_system: String,
  pub general_user: String,
  pub history_user: String,
  pub science_user: String,
  pub avoid_duplicates_template: String,
}

impl Prompts {
  pub fn category_prompt(&self, category: Category) -> &str {
    match category {
      Category::General => &self.general_user,
      Category::History => &self.history_user,
      Category::Science => &self.science_user,
    }
  }
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      multiple_choice_system: "You write Korean trivia quiz questions. Produce ONE multiple-choice question: \
        clear wording, exactly 4 options, exactly one correct option, difficulty suitable for a general audience, \
        and different from any existing question. Respond ONLY with JSON: \
        {\"question\": string, \"options\": [string, string, string, string], \"correctAnswer\": 0-3}".into(),
      fill_blank_system: "You write Korean trivia quiz questions. Produce ONE fill-in-the-blank question: \
        mark the blank with ______ (six underscores), list every acceptable answer including synonyms and \
        alternate spellings, give 2-3 hints, keep the difficulty suitable for a general audience, and make it \
        different from any existing question. Respond ONLY with JSON: \
        {\"question\": string, \"correctAnswers\": [string], \"hints\": [string]}".into(),
      general_user: "일반상식 퀴즈 문제를 한국어로 만들어 주세요. 지리, 문화, 스포츠 등 다양한 주제를 다뤄 주세요.".into(),
      history_user: "역사 퀴즈 문제를 한국어로 만들어 주세요. 한국사와 세계사를 모두 다뤄 주세요.".into(),
      science_user: "과학 퀴즈 문제를 한국어로 만들어 주세요. 물리, 화학, 생물, 지구과학을 다뤄 주세요.".into(),
      avoid_duplicates_template: "다음 기존 문제와 겹치지 않는 새로운 문제여야 합니다:\n{existing}".into(),
    }
  }
}

/// Parse a config file. IO and TOML errors are returned as strings for logging.
pub fn load_config(path: &Path) -> Result<AppConfig, String> {
  let s = std::fs::read_to_string(path).map_err(|e| format!("read failed: {}", e))?;
  toml::from_str::<AppConfig>(&s).map_err(|e| format!("parse failed: {}", e))
}

/// Attempt to load `AppConfig` from QUIZ_CONFIG_PATH. Falls back to defaults on any error.
pub fn load_config_from_env() -> AppConfig {
  let Ok(path) = std::env::var("QUIZ_CONFIG_PATH") else {
    return AppConfig::default();
  };
  match load_config(Path::new(&path)) {
    Ok(cfg) => {
      info!(target: "quiz_backend", %path, bank = cfg.questions.len(), "Loaded config (TOML)");
      cfg
    }
    Err(e) => {
      error!(target: "quiz_backend", %path, error = %e, "Failed to load config; using defaults");
      AppConfig::default()
    }
  }
}
