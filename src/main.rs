//! Quiz Challenge · Korean Quiz Backend
//!
//! - Axum HTTP API (categories, timed games, fuzzy grading, stats, admin)
//! - Optional OpenAI question generation (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   ADMIN_PASSWORD   : enables the admin API if present
//!   OPENAI_API_KEY   : enables OpenAI question generation if present
//!   OPENAI_BASE_URL  : default "https://api.openai.com/v1"
//!   OPENAI_MODEL     : default "gpt-4o"
//!   QUIZ_CONFIG_PATH : path to TOML config (game settings, grading, prompts, question bank)
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;

use quiz_backend::routes::build_router;
use quiz_backend::state::AppState;
use quiz_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: config, seeded store, admin auth, OpenAI client.
  let state = Arc::new(AppState::from_env().await?);

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quiz_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "quiz_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if tokio::signal::ctrl_c().await.is_ok() {
    info!(target: "quiz_backend", "Shutdown signal received");
  }
}
