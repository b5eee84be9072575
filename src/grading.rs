//! Fill-in-the-blank answer grading.
//!
//! Two pure pieces:
//!   - `similarity`: normalized edit distance in [0, 1]
//!   - `GradingPolicy::grade`: normalize, exact match, then best fuzzy match
//!     mapped onto a discrete (correct, score, tag) outcome
//!
//! Nothing here allocates beyond the edit-distance table, so grading can be
//! called from any handler or thread without coordination.

use serde::{Deserialize, Serialize};

/// Why a fill-blank answer got the score it got.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GradeTag {
  Exact,
  FuzzyCorrect,
  Close,
  Incorrect,
}

/// Result of grading one candidate answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
  pub is_correct: bool,
  pub score: u32,
  pub message: GradeTag,
}

/// Score bands for fuzzy grading. The defaults are the fixed 100/80/50/0 and
/// 0.8/0.6 values; `[grading]` in the config file may override them.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GradingPolicy {
  pub exact_score: u32,
  pub fuzzy_score: u32,
  pub close_score: u32,
  pub incorrect_score: u32,
  /// Strictly above this similarity counts as correct.
  pub fuzzy_threshold: f64,
  /// Strictly above this (and not above `fuzzy_threshold`) is "close".
  pub close_threshold: f64,
}

impl Default for GradingPolicy {
  fn default() -> Self {
    Self {
      exact_score: 100,
      fuzzy_score: 80,
      close_score: 50,
      incorrect_score: 0,
      fuzzy_threshold: 0.8,
      close_threshold: 0.6,
    }
  }
}

impl GradingPolicy {
  /// Grade `candidate` against every accepted answer.
  ///
  /// Returns `None` when the candidate is empty after trimming: there is
  /// nothing to grade and the caller should re-prompt instead of scoring it.
  pub fn grade<S: AsRef<str>>(&self, candidate: &str, accepted: &[S]) -> Option<Outcome> {
    let normalized = candidate.trim_matches(is_trimmable).to_lowercase();
    if normalized.is_empty() {
      return None;
    }

    let lowered: Vec<String> = accepted.iter().map(|a| a.as_ref().to_lowercase()).collect();

    if lowered.iter().any(|a| *a == normalized) {
      return Some(Outcome { is_correct: true, score: self.exact_score, message: GradeTag::Exact });
    }

    let best = lowered
      .iter()
      .map(|a| similarity(&normalized, a))
      .fold(0.0_f64, f64::max);

    Some(self.classify(best))
  }

  /// Map a best-similarity value onto its score band.
  pub fn classify(&self, best: f64) -> Outcome {
    if best > self.fuzzy_threshold {
      Outcome { is_correct: true, score: self.fuzzy_score, message: GradeTag::FuzzyCorrect }
    } else if best > self.close_threshold {
      Outcome { is_correct: false, score: self.close_score, message: GradeTag::Close }
    } else {
      Outcome { is_correct: false, score: self.incorrect_score, message: GradeTag::Incorrect }
    }
  }
}

/// Whitespace plus the byte-order mark, which browsers strip from input.
fn is_trimmable(c: char) -> bool {
  c.is_whitespace() || c == '\u{FEFF}'
}

/// Grade with the default policy.
pub fn grade<S: AsRef<str>>(candidate: &str, accepted: &[S]) -> Option<Outcome> {
  GradingPolicy::default().grade(candidate, accepted)
}

/// Normalized similarity: `(maxLen - editDistance) / maxLen`, 1.0 for two
/// empty strings. Lengths and comparisons are in UTF-16 code units, so a
/// character outside the BMP counts as two. Callers fold case first.
pub fn similarity(a: &str, b: &str) -> f64 {
  let a: Vec<u16> = a.encode_utf16().collect();
  let b: Vec<u16> = b.encode_utf16().collect();
  let max_len = a.len().max(b.len());
  if max_len == 0 {
    return 1.0;
  }
  let dist = edit_distance(&a, &b);
  (max_len - dist) as f64 / max_len as f64
}

/// Levenshtein distance with unit costs over a `(len(b)+1) x (len(a)+1)` table.
pub fn edit_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
  let cols = a.len() + 1;
  let rows = b.len() + 1;
  let mut table = vec![vec![0usize; cols]; rows];

  for (i, cell) in table[0].iter_mut().enumerate() {
    *cell = i;
  }
  for (j, row) in table.iter_mut().enumerate() {
    row[0] = j;
  }

  for j in 1..rows {
    for i in 1..cols {
      table[j][i] = if a[i - 1] == b[j - 1] {
        table[j - 1][i - 1]
      } else {
        1 + table[j - 1][i].min(table[j][i - 1]).min(table[j - 1][i - 1])
      };
    }
  }

  table[rows - 1][cols - 1]
}
