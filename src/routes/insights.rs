//! Insight proxy route.
//!
//! ERROR HANDLING
//! ==============
//! Every failure (missing key, malformed body, upstream error) is reported as
//! `500 { "error": "Failed to process request: ..." }`. The key check runs
//! before the body is parsed so an unconfigured deployment fails every
//! request the same way. Body read failures, including an oversized body,
//! take the same path instead of the extractor's plain-text rejection.

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tracing::error;

use crate::error::ErrorCode;
use crate::services::insight::{self, InsightError, InsightRequest, InsightResponse};
use crate::state::AppState;

/// Largest accepted proxy body. Article text plus a long transcript can
/// exceed the framework default.
pub(crate) const MAX_INSIGHT_BODY_BYTES: usize = 16 * 1024 * 1024;

/// `POST /functions/v1/ai-insights`: answer one question about an article.
pub async fn ai_insights(State(state): State<AppState>, body: Result<Bytes, BytesRejection>) -> Response {
    match answer(&state, body).await {
        Ok(response) => Json(InsightResponse { response }).into_response(),
        Err(e) => {
            error!(code = e.error_code(), retryable = e.retryable(), error = %e, "insight: request failed");
            failure_response(&e)
        }
    }
}

/// `OPTIONS /functions/v1/ai-insights`: bare preflight without CORS headers.
pub async fn preflight() -> &'static str {
    "ok"
}

async fn answer(state: &AppState, body: Result<Bytes, BytesRejection>) -> Result<String, InsightError> {
    let llm = state.llm.as_deref().ok_or(InsightError::NotConfigured)?;
    let body = body.map_err(|e| InsightError::UnreadableBody(e.body_text()))?;
    let request: InsightRequest = serde_json::from_slice(&body)?;
    insight::generate_insight(llm, &request).await
}

pub(crate) fn failure_response(err: &InsightError) -> Response {
    let body = serde_json::json!({ "error": format!("Failed to process request: {err}") });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

#[cfg(test)]
#[path = "insights_test.rs"]
mod tests;
