//! End-to-end tests against the assembled router (no socket, `oneshot` per request).

use std::sync::Arc;

use axum::{
  body::{to_bytes, Body},
  http::{header, Request, StatusCode},
  Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use quiz_backend::auth::AdminAuth;
use quiz_backend::config::AppConfig;
use quiz_backend::domain::QuestionBody;
use quiz_backend::routes::build_router;
use quiz_backend::state::AppState;
use quiz_backend::store::MemoryStore;

async fn setup() -> (Arc<AppState>, Router) {
  let state = AppState::new(
    AppConfig::default(),
    Arc::new(MemoryStore::new()),
    AdminAuth::new(Some("letmein".into())),
    None,
  )
  .await
  .unwrap();
  let state = Arc::new(state);
  (state.clone(), build_router(state))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  if let Some(t) = token {
    req = req.header(header::AUTHORIZATION, format!("Bearer {}", t));
  }
  let req = match body {
    Some(b) => req.header(header::CONTENT_TYPE, "application/json").body(Body::from(b.to_string())),
    None => req.body(Body::empty()),
  }
  .unwrap();

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

#[tokio::test]
async fn health_and_categories() {
  let (_, app) = setup().await;
  let (status, body) = call(&app, "GET", "/api/health", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["ok"], true);

  let (status, body) = call(&app, "GET", "/api/categories", None, None).await;
  assert_eq!(status, StatusCode::OK);
  let ids: Vec<&str> = body.as_array().unwrap().iter().map(|c| c["id"].as_str().unwrap()).collect();
  assert_eq!(ids, ["general", "history", "science"]);
}

#[tokio::test]
async fn category_questions_hide_answers() {
  let (_, app) = setup().await;
  let (status, body) = call(&app, "GET", "/api/quiz/history", None, None).await;
  assert_eq!(status, StatusCode::OK);
  let list = body.as_array().unwrap();
  assert!(!list.is_empty());
  for q in list {
    assert_eq!(q["category"], "history");
    assert!(q.get("correctAnswer").is_none());
    assert!(q.get("correctAnswers").is_none());
  }

  let (status, body) = call(&app, "GET", "/api/quiz/sports", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("sports"));
}

#[tokio::test]
async fn bad_json_bodies_are_json_400s() {
  let (_, app) = setup().await;
  let (status, body) = call(&app, "POST", "/api/games", Some(json!({ "category": "sports" })), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  let (status, body) = call(&app, "POST", "/api/grade", Some(json!({ "answer": "nope" })), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());

  // missing content type
  let req = Request::builder().method("POST").uri("/api/games").body(Body::from("{}")).unwrap();
  let resp = app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn full_game_over_http() {
  let (state, app) = setup().await;
  let (status, mut game) = call(&app, "POST", "/api/games", Some(json!({ "category": "general" })), None).await;
  assert_eq!(status, StatusCode::CREATED);
  let id = game["gameId"].as_str().unwrap().to_string();
  let total = game["totalQuestions"].as_u64().unwrap();

  // Answer the first question wrong on purpose, the rest right.
  let mut first = true;
  while !game["question"].is_null() {
    let qid = game["question"]["id"].as_u64().unwrap();
    let full = state.store.get_question(qid).await.unwrap().unwrap();
    let answer = match (&full.body, first) {
      (QuestionBody::MultipleChoice { correct_index, .. }, false) => json!({ "type": "choice", "index": correct_index }),
      (QuestionBody::MultipleChoice { correct_index, .. }, true) => {
        json!({ "type": "choice", "index": (correct_index + 1) % 4 })
      }
      (QuestionBody::FillBlank { accepted_answers, .. }, false) => json!({ "type": "text", "text": accepted_answers[0] }),
      (QuestionBody::FillBlank { .. }, true) => json!({ "type": "text", "text": "zzzzzzzzzzzz" }),
    };
    first = false;

    let (status, out) = call(&app, "POST", &format!("/api/games/{}/answer", id), Some(answer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["graded"], true);
    game = out["game"].clone();
  }
  assert_eq!(game["finished"], true);
  assert_eq!(game["score"].as_u64().unwrap(), total - 1);

  let (status, summary) = call(&app, "POST", &format!("/api/games/{}/complete", id), None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(summary["game"]["score"].as_u64().unwrap(), total - 1);
  assert_eq!(summary["game"]["accuracy"], 90);
  assert_eq!(summary["answers"].as_array().unwrap().len() as u64, total);
  assert_eq!(summary["answers"][0]["correct"], false);

  // The session is gone once recorded.
  let (status, _) = call(&app, "GET", &format!("/api/games/{}", id), None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, stats) = call(&app, "GET", "/api/stats", None, None).await;
  assert_eq!(stats["totalGames"], 1);
  assert_eq!(stats["bestScores"]["general"].as_u64().unwrap(), total - 1);

  let (_, history) = call(&app, "GET", "/api/history?limit=5", None, None).await;
  assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn grading_endpoint() {
  let (state, app) = setup().await;
  let fill = state
    .store
    .all_questions()
    .await
    .unwrap()
    .into_iter()
    .find(|q| matches!(q.body, QuestionBody::FillBlank { .. }))
    .unwrap();

  let blank = json!({ "questionId": fill.id, "answer": { "type": "text", "text": "   " } });
  let (status, out) = call(&app, "POST", "/api/grade", Some(blank), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(out["graded"], false);

  let exact = json!({ "questionId": fill.id, "answer": { "type": "text", "text": fill.expected_answer() } });
  let (_, out) = call(&app, "POST", "/api/grade", Some(exact), None).await;
  assert_eq!(out["result"]["correct"], true);
  assert_eq!(out["result"]["points"], 100);
  assert_eq!(out["result"]["verdict"], "exact");

  let missing = json!({ "questionId": 999_999, "answer": { "type": "text", "text": "x" } });
  let (status, _) = call(&app, "POST", "/api/grade", Some(missing), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn early_completion_and_abandon() {
  let (_, app) = setup().await;
  let (_, game) = call(&app, "POST", "/api/games", Some(json!({ "category": "science" })), None).await;
  let id = game["gameId"].as_str().unwrap();

  let (status, _) = call(&app, "POST", &format!("/api/games/{}/complete", id), None, None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = call(&app, "DELETE", &format!("/api/games/{}", id), None, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = call(&app, "GET", "/api/games/not-a-uuid", None, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_requires_login() {
  let (_, app) = setup().await;
  let (status, _) = call(&app, "GET", "/api/admin/questions", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) = call(&app, "GET", "/api/admin/questions", None, Some("forged")).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, _) = call(&app, "POST", "/api/admin/login", Some(json!({ "password": "nope" })), None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);

  let (status, login) = call(&app, "POST", "/api/admin/login", Some(json!({ "password": "letmein" })), None).await;
  assert_eq!(status, StatusCode::OK);
  let token = login["token"].as_str().unwrap().to_string();

  let (_, list) = call(&app, "GET", "/api/admin/questions", None, Some(&token)).await;
  let before = list.as_array().unwrap().len();

  let draft = json!({
    "category": "history",
    "question": "조선을 세운 사람은 ______ 이다.",
    "type": "fill_blank",
    "correctAnswers": ["이성계", "태조"],
    "hints": ["태조"]
  });
  let (status, created) = call(&app, "POST", "/api/admin/questions", Some(draft), Some(&token)).await;
  assert_eq!(status, StatusCode::CREATED);
  let qid = created["id"].as_u64().unwrap();

  let (_, list) = call(&app, "GET", "/api/admin/questions", None, Some(&token)).await;
  assert_eq!(list.as_array().unwrap().len(), before + 1);

  let (status, _) = call(&app, "DELETE", &format!("/api/admin/questions/{}", qid), None, Some(&token)).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = call(&app, "DELETE", &format!("/api/admin/questions/{}", qid), None, Some(&token)).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) =
    call(&app, "POST", "/api/admin/generate", Some(json!({ "category": "science" })), Some(&token)).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

  let (status, _) = call(&app, "POST", "/api/admin/logout", None, Some(&token)).await;
  assert_eq!(status, StatusCode::OK);
  let (status, _) = call(&app, "GET", "/api/admin/questions", None, Some(&token)).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_disabled_without_password() {
  let state = AppState::new(AppConfig::default(), Arc::new(MemoryStore::new()), AdminAuth::new(None), None)
    .await
    .unwrap();
  let app = build_router(Arc::new(state));
  let (status, _) = call(&app, "POST", "/api/admin/login", Some(json!({ "password": "" })), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
}
