//! Persistence seam. Handlers talk to `QuizStore`; `MemoryStore` keeps
//! everything in process with monotonically increasing ids.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::domain::{
  AnswerRecord, BestScores, Category, GameRecord, NewAnswerRecord, NewGameRecord, Question,
  QuestionDraft, QuizStats,
};
use crate::error::AppError;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait QuizStore: Send + Sync {
  /// Questions of one category in random order.
  async fn questions_by_category(&self, category: Category) -> StoreResult<Vec<Question>>;
  /// All questions ordered by id.
  async fn all_questions(&self) -> StoreResult<Vec<Question>>;
  async fn get_question(&self, id: u64) -> StoreResult<Option<Question>>;
  async fn insert_question(&self, draft: QuestionDraft) -> StoreResult<Question>;
  async fn delete_question(&self, id: u64) -> StoreResult<bool>;

  /// Store a finished game and its answers; answers are bound to the new game id.
  async fn save_game(&self, game: NewGameRecord, answers: Vec<NewAnswerRecord>) -> StoreResult<GameRecord>;
  /// Most recent games first.
  async fn game_history(&self, limit: usize) -> StoreResult<Vec<GameRecord>>;
  async fn game_answers(&self, game_id: u64) -> StoreResult<Vec<AnswerRecord>>;
  async fn best_score(&self, category: Option<Category>) -> StoreResult<u32>;

  async fn stats(&self) -> StoreResult<QuizStats> {
    let games = self.game_history(usize::MAX).await?;
    if games.is_empty() {
      return Ok(QuizStats::default());
    }
    let total: u64 = games.iter().map(|g| g.score as u64).sum();
    let average = (total as f64 / games.len() as f64).round() as u32;
    let mut best_scores = BestScores::default();
    for c in Category::ALL {
      best_scores.set(c, self.best_score(Some(c)).await?);
    }
    Ok(QuizStats {
      best_score: self.best_score(None).await?,
      average_score: average,
      total_games: games.len(),
      best_scores,
    })
  }
}

#[derive(Default)]
struct Tables {
  questions: BTreeMap<u64, Question>,
  games: BTreeMap<u64, GameRecord>,
  answers: BTreeMap<u64, AnswerRecord>,
  next_question_id: u64,
  next_game_id: u64,
  next_answer_id: u64,
}

fn bump(counter: &mut u64) -> u64 {
  *counter += 1;
  *counter
}

#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl QuizStore for MemoryStore {
  #[instrument(level = "debug", skip(self))]
  async fn questions_by_category(&self, category: Category) -> StoreResult<Vec<Question>> {
    let mut out: Vec<Question> = {
      let t = self.tables.read().await;
      t.questions.values().filter(|q| q.category == category).cloned().collect()
    };
    out.shuffle(&mut rand::thread_rng());
    Ok(out)
  }

  async fn all_questions(&self) -> StoreResult<Vec<Question>> {
    Ok(self.tables.read().await.questions.values().cloned().collect())
  }

  async fn get_question(&self, id: u64) -> StoreResult<Option<Question>> {
    Ok(self.tables.read().await.questions.get(&id).cloned())
  }

  #[instrument(level = "debug", skip(self, draft), fields(category = %draft.category))]
  async fn insert_question(&self, draft: QuestionDraft) -> StoreResult<Question> {
    let mut t = self.tables.write().await;
    let id = bump(&mut t.next_question_id);
    let q = Question::from_draft(id, draft);
    t.questions.insert(id, q.clone());
    debug!(target: "quiz", id, "Question stored");
    Ok(q)
  }

  async fn delete_question(&self, id: u64) -> StoreResult<bool> {
    Ok(self.tables.write().await.questions.remove(&id).is_some())
  }

  #[instrument(level = "debug", skip(self, game, answers), fields(category = %game.category, answers = answers.len()))]
  async fn save_game(&self, game: NewGameRecord, answers: Vec<NewAnswerRecord>) -> StoreResult<GameRecord> {
    let mut t = self.tables.write().await;
    let id = bump(&mut t.next_game_id);
    let record = GameRecord {
      id,
      category: game.category,
      score: game.score,
      total_questions: game.total_questions,
      time_spent: game.time_spent,
      accuracy: game.accuracy,
      points: game.points,
      created_at: Utc::now(),
    };
    t.games.insert(id, record.clone());
    for a in answers {
      let answer_id = bump(&mut t.next_answer_id);
      t.answers.insert(
        answer_id,
        AnswerRecord {
          id: answer_id,
          game_id: id,
          question_id: a.question_id,
          answer: a.answer,
          is_correct: a.is_correct,
          points: a.points,
        },
      );
    }
    Ok(record)
  }

  async fn game_history(&self, limit: usize) -> StoreResult<Vec<GameRecord>> {
    let t = self.tables.read().await;
    let mut games: Vec<GameRecord> = t.games.values().cloned().collect();
    // ids break ties between games stored within the same clock tick
    games.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    games.truncate(limit);
    Ok(games)
  }

  async fn game_answers(&self, game_id: u64) -> StoreResult<Vec<AnswerRecord>> {
    let t = self.tables.read().await;
    Ok(t.answers.values().filter(|a| a.game_id == game_id).cloned().collect())
  }

  async fn best_score(&self, category: Option<Category>) -> StoreResult<u32> {
    let t = self.tables.read().await;
    Ok(t
      .games
      .values()
      .filter(|g| category.map_or(true, |c| g.category == c))
      .map(|g| g.score)
      .max()
      .unwrap_or(0))
  }
}
