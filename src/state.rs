//! Application state: question store, live game sessions, admin auth,
//! settings/prompts from config, and the optional OpenAI client.
//!
//! Startup loads the TOML config (if any), inserts its question bank, then
//! the built-in seeds, and logs the resulting inventory per category.

use std::{
  collections::HashMap,
  sync::Arc,
  time::{Duration, Instant},
};

use tokio::sync::RwLock;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::AdminAuth;
use crate::config::{load_config_from_env, AppConfig, GameSettings, Prompts};
use crate::domain::Category;
use crate::error::AppError;
use crate::grading::GradingPolicy;
use crate::openai::OpenAI;
use crate::seeds::seed_questions;
use crate::session::{GameSession, TimeLimits};
use crate::store::{MemoryStore, QuizStore};

pub struct AppState {
  pub store: Arc<dyn QuizStore>,
  pub sessions: RwLock<HashMap<Uuid, GameSession>>,
  pub admin: AdminAuth,
  pub openai: Option<OpenAI>,
  pub settings: GameSettings,
  pub grading: GradingPolicy,
  pub prompts: Prompts,
}

impl AppState {
  /// Build state from env: load config, init admin auth and OpenAI, seed an in-memory store.
  #[instrument(level = "info", skip_all)]
  pub async fn from_env() -> Result<Self, AppError> {
    let cfg = load_config_from_env();

    let openai = OpenAI::from_env();
    if let Some(oa) = &openai {
      info!(target: "quiz_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
    } else {
      info!(target: "quiz_backend", "OpenAI disabled (no OPENAI_API_KEY). Question generation unavailable.");
    }

    let admin = AdminAuth::from_env();
    if !admin.enabled() {
      info!(target: "quiz_backend", "Admin panel disabled (no ADMIN_PASSWORD).");
    }

    Self::new(cfg, Arc::new(MemoryStore::new()), admin, openai).await
  }

  /// Assemble state and load the config bank plus built-in seeds into `store`.
  /// Invalid bank entries are skipped.
  pub async fn new(
    cfg: AppConfig,
    store: Arc<dyn QuizStore>,
    admin: AdminAuth,
    openai: Option<OpenAI>,
  ) -> Result<Self, AppError> {
    for (i, qc) in cfg.questions.iter().enumerate() {
      match qc.resolve() {
        Ok(draft) => {
          store.insert_question(draft).await?;
        }
        Err(e) => {
          error!(target: "quiz", index = i, category = %qc.category, error = %e, "Skipping bank question");
        }
      }
    }
    for draft in seed_questions() {
      store.insert_question(draft).await?;
    }

    let all = store.all_questions().await?;
    for c in Category::ALL {
      let count = all.iter().filter(|q| q.category == c).count();
      info!(target: "quiz", category = %c, questions = count, "Startup question inventory");
    }

    Ok(Self {
      store,
      sessions: RwLock::new(HashMap::new()),
      admin,
      openai,
      settings: cfg.game,
      grading: cfg.grading,
      prompts: cfg.prompts,
    })
  }

  pub fn time_limits(&self) -> TimeLimits {
    TimeLimits {
      per_question: Duration::from_secs(self.settings.seconds_per_question),
      grace: Duration::from_secs(self.settings.answer_grace_secs),
    }
  }

  /// Drop sessions that were started longer ago than the configured TTL.
  pub async fn prune_sessions(&self, now: Instant) -> usize {
    let ttl = Duration::from_secs(self.settings.session_ttl_secs);
    let mut sessions = self.sessions.write().await;
    let before = sessions.len();
    sessions.retain(|_, s| now.saturating_duration_since(s.started_at()) < ttl);
    before - sessions.len()
  }
}
