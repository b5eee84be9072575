//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    extract::FromRequest,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::error::AppError;
use crate::state::AppState;

pub mod admin;
pub mod http;

/// `Json` body extractor whose rejections render as `AppError::BadRequest`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Build the application router with:
/// - player API under `/api/...`
/// - admin API under `/api/admin/...` (bearer token)
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers); tighten for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/api/health", get(http::http_health))
        .route("/api/categories", get(http::http_categories))
        .route("/api/quiz/:category", get(http::http_category_questions))
        .route("/api/grade", post(http::http_post_grade))
        .route("/api/games", post(http::http_start_game))
        .route("/api/games/:id", get(http::http_get_game).delete(http::http_abandon_game))
        .route("/api/games/:id/answer", post(http::http_post_answer))
        .route("/api/games/:id/hint", get(http::http_get_hint))
        .route("/api/games/:id/complete", post(http::http_complete_game))
        .route("/api/stats", get(http::http_stats))
        .route("/api/history", get(http::http_history))
        // Admin
        .route("/api/admin/login", post(admin::http_login))
        .route("/api/admin/logout", post(admin::http_logout))
        .route(
            "/api/admin/questions",
            get(admin::http_list_questions).post(admin::http_create_question),
        )
        .route("/api/admin/questions/:id", delete(admin::http_delete_question))
        .route("/api/admin/generate", post(admin::http_generate_question))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
