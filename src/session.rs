//! One in-progress game: question order, per-question timer, judged answers
//! and hint reveals. Clock readings are passed in so the timer is testable.

use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Category, NewAnswerRecord, NewGameRecord, Question, QuestionBody, SubmittedAnswer};
use crate::error::AppError;
use crate::grading::{GradeTag, GradingPolicy};

/// Points for a correct multiple-choice pick; matches an exact fill-blank answer.
pub const CHOICE_POINTS: u32 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
  Correct,
  Incorrect,
  TimedOut,
  Exact,
  FuzzyCorrect,
  Close,
}

impl From<GradeTag> for Verdict {
  fn from(t: GradeTag) -> Self {
    match t {
      GradeTag::Exact => Verdict::Exact,
      GradeTag::FuzzyCorrect => Verdict::FuzzyCorrect,
      GradeTag::Close => Verdict::Close,
      GradeTag::Incorrect => Verdict::Incorrect,
    }
  }
}

/// Result of judging one answer against one question.
#[derive(Clone, Debug, PartialEq)]
pub struct Judgement {
  pub question_id: u64,
  pub answer: SubmittedAnswer,
  pub is_correct: bool,
  pub points: u32,
  pub verdict: Verdict,
  pub expected: String,
}

/// Judge `answer` for `question`. `Ok(None)` means a blank fill-blank answer:
/// nothing was graded and the player should be asked again.
pub fn judge(question: &Question, answer: &SubmittedAnswer, policy: &GradingPolicy) -> Result<Option<Judgement>, AppError> {
  let (is_correct, points, verdict) = match (&question.body, answer) {
    (_, SubmittedAnswer::Timeout) => (false, 0, Verdict::TimedOut),
    (QuestionBody::MultipleChoice { options, correct_index }, SubmittedAnswer::Choice { index }) => {
      if *index >= options.len() {
        return Err(AppError::BadRequest(format!("Choice {} out of range ({} options)", index, options.len())));
      }
      if index == correct_index {
        (true, CHOICE_POINTS, Verdict::Correct)
      } else {
        (false, 0, Verdict::Incorrect)
      }
    }
    (QuestionBody::FillBlank { accepted_answers, .. }, SubmittedAnswer::Text { text }) => {
      match policy.grade(text, accepted_answers) {
        Some(o) => (o.is_correct, o.score, Verdict::from(o.message)),
        None => return Ok(None),
      }
    }
    (QuestionBody::MultipleChoice { .. }, _) => {
      return Err(AppError::BadRequest("Multiple-choice questions take a choice answer".into()));
    }
    (QuestionBody::FillBlank { .. }, _) => {
      return Err(AppError::BadRequest("Fill-blank questions take a text answer".into()));
    }
  };

  Ok(Some(Judgement {
    question_id: question.id,
    answer: answer.clone(),
    is_correct,
    points,
    verdict,
    expected: question.expected_answer(),
  }))
}

/// Timer limits applied to a session.
#[derive(Clone, Copy, Debug)]
pub struct TimeLimits {
  pub per_question: Duration,
  pub grace: Duration,
}

/// Next hint for the current fill-blank question.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HintReveal {
  pub text: Option<String>,
  pub remaining: usize,
}

/// Final numbers of a finished game.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSummary {
  pub record: NewGameRecord,
  pub answers: Vec<NewAnswerRecord>,
}

#[derive(Clone, Debug)]
pub struct GameSession {
  pub id: Uuid,
  pub category: Category,
  pub questions: Vec<Question>,
  pub answers: Vec<Judgement>,
  cursor: usize,
  started_at: Instant,
  question_started_at: Instant,
  hints_revealed: usize,
}

impl GameSession {
  pub fn new(category: Category, questions: Vec<Question>, now: Instant) -> Self {
    Self {
      id: Uuid::new_v4(),
      category,
      questions,
      answers: Vec::new(),
      cursor: 0,
      started_at: now,
      question_started_at: now,
      hints_revealed: 0,
    }
  }

  pub fn current(&self) -> Option<&Question> {
    self.questions.get(self.cursor)
  }

  /// Zero-based index of the current question (equals total once finished).
  pub fn index(&self) -> usize {
    self.cursor
  }

  pub fn is_finished(&self) -> bool {
    self.cursor >= self.questions.len()
  }

  pub fn started_at(&self) -> Instant {
    self.started_at
  }

  pub fn correct_count(&self) -> u32 {
    self.answers.iter().filter(|j| j.is_correct).count() as u32
  }

  pub fn points(&self) -> u32 {
    self.answers.iter().map(|j| j.points).sum()
  }

  pub fn seconds_remaining(&self, now: Instant, limits: &TimeLimits) -> u64 {
    limits
      .per_question
      .saturating_sub(now.saturating_duration_since(self.question_started_at))
      .as_secs()
  }

  /// Judge an answer for the current question and advance on success.
  /// Answers arriving after the timer (plus grace) count as timeouts.
  pub fn submit(
    &mut self,
    answer: SubmittedAnswer,
    now: Instant,
    limits: &TimeLimits,
    policy: &GradingPolicy,
  ) -> Result<Option<Judgement>, AppError> {
    let question = self
      .current()
      .ok_or_else(|| AppError::Conflict("Game already finished".into()))?;

    let elapsed = now.saturating_duration_since(self.question_started_at);
    let answer = if elapsed > limits.per_question.saturating_add(limits.grace) {
      SubmittedAnswer::Timeout
    } else {
      answer
    };

    let Some(judgement) = judge(question, &answer, policy)? else {
      return Ok(None);
    };

    self.answers.push(judgement.clone());
    self.cursor += 1;
    self.question_started_at = now;
    self.hints_revealed = 0;
    Ok(Some(judgement))
  }

  /// Reveal the next hint of the current fill-blank question.
  pub fn next_hint(&mut self) -> Result<HintReveal, AppError> {
    let question = self
      .current()
      .ok_or_else(|| AppError::Conflict("Game already finished".into()))?;
    let QuestionBody::FillBlank { hints, .. } = &question.body else {
      return Err(AppError::BadRequest("Hints are only available for fill-blank questions".into()));
    };

    let text = hints.get(self.hints_revealed).cloned();
    let total = hints.len();
    if text.is_some() {
      self.hints_revealed += 1;
    }
    Ok(HintReveal { text, remaining: total - self.hints_revealed.min(total) })
  }

  /// Score, accuracy and answer records of a finished game.
  pub fn summary(&self, now: Instant) -> Result<GameSummary, AppError> {
    if !self.is_finished() {
      return Err(AppError::Conflict(format!(
        "Game not finished: {} of {} questions answered",
        self.answers.len(),
        self.questions.len()
      )));
    }
    let total = self.questions.len() as u32;
    let score = self.correct_count();
    let accuracy = if total == 0 { 0 } else { (score as f64 / total as f64 * 100.0).round() as u32 };

    Ok(GameSummary {
      record: NewGameRecord {
        category: self.category,
        score,
        total_questions: total,
        time_spent: now.saturating_duration_since(self.started_at).as_secs(),
        accuracy,
        points: self.points(),
      },
      answers: self
        .answers
        .iter()
        .map(|j| NewAnswerRecord {
          question_id: j.question_id,
          answer: j.answer.clone(),
          is_correct: j.is_correct,
          points: j.points,
        })
        .collect(),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn limits() -> TimeLimits {
    TimeLimits { per_question: Duration::from_secs(30), grace: Duration::from_secs(2) }
  }

  fn mc(id: u64, correct: usize) -> Question {
    Question {
      id,
      category: Category::General,
      question: format!("q{id}"),
      body: QuestionBody::MultipleChoice {
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_index: correct,
      },
    }
  }

  fn fill(id: u64) -> Question {
    Question {
      id,
      category: Category::General,
      question: "대한민국의 수도는 ______ 이다.".into(),
      body: QuestionBody::FillBlank {
        accepted_answers: vec!["Seoul".into(), "서울".into()],
        hints: vec!["한강".into(), "수도권".into()],
      },
    }
  }

  #[test]
  fn judge_multiple_choice() {
    let p = GradingPolicy::default();
    let right = judge(&mc(1, 2), &SubmittedAnswer::Choice { index: 2 }, &p).unwrap().unwrap();
    assert_eq!((right.is_correct, right.points, right.verdict), (true, 100, Verdict::Correct));
    assert_eq!(right.expected, "c");

    let wrong = judge(&mc(1, 2), &SubmittedAnswer::Choice { index: 0 }, &p).unwrap().unwrap();
    assert_eq!((wrong.is_correct, wrong.points, wrong.verdict), (false, 0, Verdict::Incorrect));

    assert!(judge(&mc(1, 2), &SubmittedAnswer::Choice { index: 4 }, &p).is_err());
    assert!(judge(&mc(1, 2), &SubmittedAnswer::Text { text: "c".into() }, &p).is_err());
  }

  #[test]
  fn judge_fill_blank_uses_grader() {
    let p = GradingPolicy::default();
    let close = judge(&fill(1), &SubmittedAnswer::Text { text: "Seol".into() }, &p).unwrap().unwrap();
    assert_eq!((close.is_correct, close.points, close.verdict), (false, 50, Verdict::Close));

    let blank = judge(&fill(1), &SubmittedAnswer::Text { text: "  ".into() }, &p).unwrap();
    assert_eq!(blank, None);

    assert!(judge(&fill(1), &SubmittedAnswer::Choice { index: 0 }, &p).is_err());
  }

  #[test]
  fn full_game_flow_and_summary() {
    let p = GradingPolicy::default();
    let t0 = Instant::now();
    let mut s = GameSession::new(Category::General, vec![mc(1, 0), fill(2), mc(3, 1)], t0);

    let j = s.submit(SubmittedAnswer::Choice { index: 0 }, t0 + Duration::from_secs(5), &limits(), &p).unwrap();
    assert!(j.unwrap().is_correct);
    let j = s.submit(SubmittedAnswer::Text { text: " seoul ".into() }, t0 + Duration::from_secs(10), &limits(), &p).unwrap();
    assert_eq!(j.unwrap().verdict, Verdict::Exact);
    let j = s.submit(SubmittedAnswer::Choice { index: 3 }, t0 + Duration::from_secs(15), &limits(), &p).unwrap();
    assert!(!j.unwrap().is_correct);

    assert!(s.is_finished());
    assert!(s.submit(SubmittedAnswer::Timeout, t0, &limits(), &p).is_err());

    let summary = s.summary(t0 + Duration::from_secs(20)).unwrap();
    assert_eq!(summary.record.score, 2);
    assert_eq!(summary.record.total_questions, 3);
    assert_eq!(summary.record.accuracy, 67);
    assert_eq!(summary.record.points, 200);
    assert_eq!(summary.record.time_spent, 20);
    assert_eq!(summary.answers.len(), 3);
  }

  #[test]
  fn blank_text_does_not_advance() {
    let p = GradingPolicy::default();
    let t0 = Instant::now();
    let mut s = GameSession::new(Category::General, vec![fill(1)], t0);
    assert_eq!(s.submit(SubmittedAnswer::Text { text: "".into() }, t0, &limits(), &p).unwrap(), None);
    assert_eq!(s.index(), 0);
    assert!(s.answers.is_empty());
  }

  #[test]
  fn late_answer_becomes_timeout() {
    let p = GradingPolicy::default();
    let t0 = Instant::now();
    let mut s = GameSession::new(Category::General, vec![mc(1, 0), mc(2, 0)], t0);

    // inside the grace window still counts
    let j = s.submit(SubmittedAnswer::Choice { index: 0 }, t0 + Duration::from_secs(31), &limits(), &p).unwrap().unwrap();
    assert!(j.is_correct);

    let t1 = t0 + Duration::from_secs(31);
    let j = s.submit(SubmittedAnswer::Choice { index: 0 }, t1 + Duration::from_secs(40), &limits(), &p).unwrap().unwrap();
    assert_eq!(j.verdict, Verdict::TimedOut);
    assert_eq!(j.answer, SubmittedAnswer::Timeout);
    assert!(!j.is_correct);
  }

  #[test]
  fn huge_time_limit_never_times_out() {
    let p = GradingPolicy::default();
    let t0 = Instant::now();
    let mut s = GameSession::new(Category::General, vec![mc(1, 0)], t0);
    let forever = TimeLimits { per_question: Duration::MAX, grace: Duration::from_secs(2) };
    let j = s.submit(SubmittedAnswer::Choice { index: 0 }, t0 + Duration::from_secs(3600), &forever, &p).unwrap().unwrap();
    assert_eq!(j.verdict, Verdict::Correct);
  }

  #[test]
  fn timer_resets_per_question() {
    let p = GradingPolicy::default();
    let t0 = Instant::now();
    let mut s = GameSession::new(Category::General, vec![mc(1, 0), mc(2, 0)], t0);
    assert_eq!(s.seconds_remaining(t0 + Duration::from_secs(12), &limits()), 18);
    s.submit(SubmittedAnswer::Choice { index: 1 }, t0 + Duration::from_secs(12), &limits(), &p).unwrap();
    assert_eq!(s.seconds_remaining(t0 + Duration::from_secs(12), &limits()), 30);
    assert_eq!(s.seconds_remaining(t0 + Duration::from_secs(100), &limits()), 0);
  }

  #[test]
  fn hints_are_revealed_in_order() {
    let t0 = Instant::now();
    let mut s = GameSession::new(Category::General, vec![fill(1), mc(2, 0)], t0);
    assert_eq!(s.next_hint().unwrap(), HintReveal { text: Some("한강".into()), remaining: 1 });
    assert_eq!(s.next_hint().unwrap(), HintReveal { text: Some("수도권".into()), remaining: 0 });
    assert_eq!(s.next_hint().unwrap(), HintReveal { text: None, remaining: 0 });

    s.submit(SubmittedAnswer::Timeout, t0, &limits(), &GradingPolicy::default()).unwrap();
    assert!(s.next_hint().is_err());
  }

  #[test]
  fn summary_requires_finished_game() {
    let t0 = Instant::now();
    let s = GameSession::new(Category::General, vec![mc(1, 0)], t0);
    assert!(matches!(s.summary(t0), Err(AppError::Conflict(_))));
  }
}
