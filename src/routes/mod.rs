//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The chat widget talks to the JSON API under `/api/chat`. When
//! `WEBSITE_DIR` is set the built marketing site is served as static files
//! for every other path.

pub mod chat;

use std::path::PathBuf;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Chat API routes plus health check.
pub fn api_routes(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // base64 inflates images by a third, and advice requests also carry
    // earlier photos from the caller's history.
    let body_limit = state.chat.max_image_bytes.saturating_mul(4);

    Router::new()
        .route("/api/chat/sessions", post(chat::create_session))
        .route("/api/chat/sessions/{id}", get(chat::get_session).delete(chat::end_session))
        .route("/api/chat/sessions/{id}/messages", post(chat::post_message))
        .route("/api/chat/advice", post(chat::post_advice))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

/// Full application: API routes, optional static site, request tracing.
pub fn app(state: AppState, website_dir: Option<PathBuf>) -> Router {
    let router = api_routes(state);
    let router = match website_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => router,
    };
    router.layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
