//! Minimal OpenAI client for question generation.
//!
//! We only call chat.completions with a strict JSON response format and validate
//! the result into a typed `QuestionDraft` before anyone can store it.
//!
//! NOTE: We never log the API key or the generated content, only sizes and usage.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::Prompts;
use crate::domain::{Category, QuestionBody, QuestionDraft, QuestionKind};
use crate::util::fill_template;

/// Cap on how many existing questions are listed in the prompt.
const MAX_EXISTING_IN_PROMPT: usize = 30;

#[derive(Debug, Error)]
pub enum GenerateError {
  #[error("OpenAI HTTP {status}: {message}")]
  Http { status: u16, message: String },

  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("JSON parse error: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("invalid {0}")]
  InvalidShape(String),
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

/// Raw model output. Both kinds share one loose shape until `into_draft`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Generated {
  #[serde(default)]
  question: String,
  #[serde(default)]
  options: Vec<String>,
  #[serde(default)]
  correct_answer: Option<i64>,
  #[serde(default)]
  correct_answers: Vec<String>,
  #[serde(default)]
  hints: Vec<String>,
}

impl Generated {
  fn into_draft(self, category: Category, kind: QuestionKind) -> Result<QuestionDraft, GenerateError> {
    if self.question.trim().is_empty() {
      return Err(GenerateError::InvalidShape("response: empty question".into()));
    }
    let body = match kind {
      QuestionKind::MultipleChoice => {
        if self.options.len() != 4 {
          return Err(GenerateError::InvalidShape(format!(
            "multiple_choice response: expected 4 options, got {}",
            self.options.len()
          )));
        }
        let idx = match self.correct_answer {
          Some(i @ 0..=3) => i as usize,
          other => {
            return Err(GenerateError::InvalidShape(format!(
              "multiple_choice response: correctAnswer {:?}",
              other
            )))
          }
        };
        QuestionBody::MultipleChoice { options: self.options, correct_index: idx }
      }
      QuestionKind::FillBlank => {
        if self.correct_answers.is_empty() {
          return Err(GenerateError::InvalidShape("fill_blank response: no correctAnswers".into()));
        }
        QuestionBody::FillBlank { accepted_answers: self.correct_answers, hints: self.hints }
      }
    };

    let draft = QuestionDraft { category, question: self.question, body };
    draft.validate().map_err(GenerateError::InvalidShape)?;
    Ok(draft)
  }
}

impl OpenAI {
  pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .ok()?;
    Some(Self { client, api_key: api_key.into(), base_url: base_url.into(), model: model.into() })
  }

  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())?;
    let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into());
    Self::new(api_key, base_url, model)
  }

  /// JSON-object chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user), fields(model = %self.model))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<T, GenerateError> {
    let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: ResponseFormat { r#type: "json_object".into() },
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "quiz-challenge-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req)
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      return Err(GenerateError::Http { status, message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body
      .choices
      .first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();

    Ok(serde_json::from_str::<T>(&text)?)
  }

  /// Generate one question of `kind` for `category`, steering away from `existing`.
  #[instrument(level = "info", skip_all, fields(%category, ?kind, existing = existing.len()))]
  pub async fn generate_question(
    &self,
    prompts: &Prompts,
    category: Category,
    kind: QuestionKind,
    existing: &[String],
  ) -> Result<QuestionDraft, GenerateError> {
    let system = match kind {
      QuestionKind::MultipleChoice => &prompts.multiple_choice_system,
      QuestionKind::FillBlank => &prompts.fill_blank_system,
    };
    let user = build_user_prompt(prompts, category, existing);

    let start = std::time::Instant::now();
    let result = self.chat_json::<Generated>(system, &user, 0.9).await;
    let elapsed = start.elapsed();

    let draft = match result {
      Ok(g) => g.into_draft(category, kind),
      Err(e) => Err(e),
    };
    match &draft {
      Ok(d) => info!(?elapsed, question_len = d.question.len(), "Question generated"),
      Err(e) => error!(?elapsed, error = %e, "Question generation failed"),
    }
    draft
  }
}

fn build_user_prompt(prompts: &Prompts, category: Category, existing: &[String]) -> String {
  let mut user = prompts.category_prompt(category).to_string();
  if !existing.is_empty() {
    let list = existing
      .iter()
      .take(MAX_EXISTING_IN_PROMPT)
      .enumerate()
      .map(|(i, q)| format!("{}. {}", i + 1, q))
      .collect::<Vec<_>>()
      .join("\n");
    user.push_str("\n\n");
    user.push_str(&fill_template(&prompts.avoid_duplicates_template, &[("existing", &list)]));
  }
  user
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  response_format: ResponseFormat,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use wiremock::matchers::{header, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
      "choices": [{"message": {"role": "assistant", "content": content.to_string()}, "index": 0}],
      "usage": {"prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160}
    })
  }

  async fn client_for(server: &MockServer) -> OpenAI {
    OpenAI::new("test-key", format!("{}/v1", server.uri()), "gpt-4o").unwrap()
  }

  #[tokio::test]
  async fn generates_multiple_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/chat/completions"))
      .and(header("Authorization", "Bearer test-key"))
      .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
        "question": "태양에서 가장 가까운 행성은?",
        "options": ["수성", "금성", "지구", "화성"],
        "correctAnswer": 0
      }))))
      .mount(&server)
      .await;

    let oa = client_for(&server).await;
    let d = oa
      .generate_question(&Prompts::default(), Category::Science, QuestionKind::MultipleChoice, &[])
      .await
      .unwrap();
    assert_eq!(d.category, Category::Science);
    assert_eq!(
      d.body,
      QuestionBody::MultipleChoice {
        options: vec!["수성".into(), "금성".into(), "지구".into(), "화성".into()],
        correct_index: 0
      }
    );
  }

  #[tokio::test]
  async fn generates_fill_blank() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/chat/completions"))
      .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
        "question": "빛의 삼원색은 빨강, 초록, ______ 이다.",
        "correctAnswers": ["파랑", "파란색", "blue"],
        "hints": ["하늘의 색"]
      }))))
      .mount(&server)
      .await;

    let oa = client_for(&server).await;
    let d = oa
      .generate_question(&Prompts::default(), Category::Science, QuestionKind::FillBlank, &["기존 문제".into()])
      .await
      .unwrap();
    assert_eq!(d.body.kind(), QuestionKind::FillBlank);
  }

  #[tokio::test]
  async fn rejects_malformed_multiple_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/chat/completions"))
      .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
        "question": "선택지가 부족한 문제",
        "options": ["a", "b", "c"],
        "correctAnswer": 5
      }))))
      .mount(&server)
      .await;

    let oa = client_for(&server).await;
    let err = oa
      .generate_question(&Prompts::default(), Category::General, QuestionKind::MultipleChoice, &[])
      .await
      .unwrap_err();
    assert!(matches!(err, GenerateError::InvalidShape(_)), "{err}");
  }

  #[tokio::test]
  async fn surfaces_api_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/v1/chat/completions"))
      .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "Incorrect API key"}})))
      .mount(&server)
      .await;

    let oa = client_for(&server).await;
    let err = oa
      .generate_question(&Prompts::default(), Category::General, QuestionKind::FillBlank, &[])
      .await
      .unwrap_err();
    match err {
      GenerateError::Http { status, message } => {
        assert_eq!(status, 401);
        assert_eq!(message, "Incorrect API key");
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn prompt_lists_existing_questions() {
    let p = Prompts::default();
    let user = build_user_prompt(&p, Category::History, &["A?".into(), "B?".into()]);
    assert!(user.starts_with(&p.history_user));
    assert!(user.contains("1. A?\n2. B?"));

    assert_eq!(build_user_prompt(&p, Category::History, &[]), p.history_user);
  }
}
