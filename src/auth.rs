//! Admin credentials. The password comes from `ADMIN_PASSWORD`; a successful
//! login hands out a random bearer token that admin routes check.

use std::{
  collections::HashMap,
  time::{Duration, Instant},
};

use axum::http::{header::AUTHORIZATION, HeaderMap};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;

const TOKEN_TTL: Duration = Duration::from_secs(12 * 60 * 60);

pub struct AdminAuth {
  password: Option<String>,
  tokens: RwLock<HashMap<String, Instant>>,
}

impl AdminAuth {
  pub fn new(password: Option<String>) -> Self {
    let password = password.filter(|p| !p.is_empty());
    Self { password, tokens: RwLock::new(HashMap::new()) }
  }

  pub fn from_env() -> Self {
    Self::new(std::env::var("ADMIN_PASSWORD").ok())
  }

  pub fn enabled(&self) -> bool {
    self.password.is_some()
  }

  pub async fn login(&self, attempt: &str) -> Result<String, AppError> {
    let Some(expected) = &self.password else {
      return Err(AppError::Forbidden("Admin access is disabled (ADMIN_PASSWORD not set)".into()));
    };
    if !constant_time_compare(attempt, expected) {
      warn!(target: "quiz_backend", "Admin login rejected");
      return Err(AppError::Unauthorized);
    }
    let token = Uuid::new_v4().to_string();
    let now = Instant::now();
    let mut tokens = self.tokens.write().await;
    tokens.retain(|_, issued| now.duration_since(*issued) < TOKEN_TTL);
    tokens.insert(token.clone(), now);
    info!(target: "quiz_backend", active = tokens.len(), "Admin logged in");
    Ok(token)
  }

  pub async fn verify(&self, token: &str) -> Result<(), AppError> {
    let tokens = self.tokens.read().await;
    match tokens.get(token) {
      Some(issued) if issued.elapsed() < TOKEN_TTL => Ok(()),
      _ => Err(AppError::Unauthorized),
    }
  }

  pub async fn logout(&self, token: &str) {
    self.tokens.write().await.remove(token);
  }

  /// Check the `Authorization: Bearer <token>` header and return the token.
  pub async fn require(&self, headers: &HeaderMap) -> Result<String, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    self.verify(token).await?;
    Ok(token.to_string())
  }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

fn constant_time_compare(a: &str, b: &str) -> bool {
  if a.len() != b.len() {
    return false;
  }
  a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
