//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the insight proxy and the catalog REST API under a
//! single Axum router. The proxy is mounted at the serverless-function path
//! the browser client already calls, plus an `/api` alias.

pub mod auth;
pub mod blogs;
pub mod chat;
pub mod folders;
pub mod insights;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{MethodRouter, get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full HTTP surface.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/functions/v1/ai-insights", insight_routes())
        .route("/api/ai-insights", insight_routes())
        .route("/api/auth/me", get(auth::me))
        .route("/api/blogs", get(blogs::list_blogs).post(blogs::create_blog))
        .route("/api/blogs/stats", get(blogs::blog_stats))
        .route(
            "/api/blogs/{id}",
            get(blogs::get_blog)
                .patch(blogs::update_blog)
                .delete(blogs::delete_blog),
        )
        .route("/api/blogs/{id}/chat-session", get(chat::get_chat_session))
        .route("/api/blogs/{id}/chat", post(chat::send_chat_message))
        .route("/api/folders", get(folders::list_folders).post(folders::create_folder))
        .route(
            "/api/folders/{id}",
            patch(folders::update_folder).delete(folders::delete_folder),
        )
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn insight_routes() -> MethodRouter<AppState> {
    post(insights::ai_insights)
        .options(insights::preflight)
        .layer(DefaultBodyLimit::max(insights::MAX_INSIGHT_BODY_BYTES))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
