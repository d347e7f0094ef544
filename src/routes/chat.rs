//! Per-article AI chat routes backed by the session store.
//!
//! The browser asks questions here rather than calling the proxy directly;
//! the transcript is loaded, extended and saved server-side for the caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::routes::auth::AuthUser;
use crate::routes::blogs::catalog_error_to_status;
use crate::services::catalog::{self, ArticleRow};
use crate::services::chat_session::{self, ArticleContext, ChatTranscript};
use crate::services::chat_store::{ChatMessage, ChatSession, ChatSessionStore, StoreError};
use crate::services::insight::InsightError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
    pub session_id: Option<Uuid>,
    pub messages: Vec<ChatMessage>,
    pub persisted: bool,
}

/// `GET /api/blogs/:id/chat-session`: the caller's latest session, or `null`.
pub async fn get_chat_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(article_id): Path<Uuid>,
) -> Result<Json<Option<ChatSession>>, StatusCode> {
    let session = state
        .sessions
        .find_latest_session(auth.user_id, article_id)
        .await
        .map_err(store_error_to_status)?;
    Ok(Json(session))
}

/// `POST /api/blogs/:id/chat`: ask one question about an article.
pub async fn send_chat_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(article_id): Path<Uuid>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, StatusCode> {
    let article = catalog::get_article(&state.pool, article_id)
        .await
        .map_err(catalog_error_to_status)?;
    let llm = state.llm.as_deref();

    converse(llm, state.sessions.as_ref(), auth.user_id, &article, &body.message).await.map(Json)
}

/// Gatekeeping plus one exchange for an already loaded article.
pub(crate) async fn converse(
    llm: Option<&dyn LlmChat>,
    store: &dyn ChatSessionStore,
    user_id: Uuid,
    article: &ArticleRow,
    message: &str,
) -> Result<ChatReply, StatusCode> {
    if !article.ai_insights_enabled {
        return Err(StatusCode::FORBIDDEN);
    }
    let llm = llm.ok_or_else(|| insight_error_to_status(&InsightError::NotConfigured))?;
    let message = message.trim();
    if message.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let mut transcript = ChatTranscript::open(store, user_id, article.id)
        .await
        .map_err(store_error_to_status)?;
    debug!(%user_id, article_id = %article.id, binding = ?transcript.binding(), "chat: transcript opened");
    let context = ArticleContext { title: article.title.clone(), content: article.insight_content() };

    let outcome = chat_session::ask(llm, store, &context, &mut transcript, message)
        .await
        .map_err(|e| insight_error_to_status(&e))?;

    Ok(ChatReply {
        response: outcome.response,
        session_id: outcome.session_id,
        messages: transcript.into_messages(),
        persisted: outcome.persisted,
    })
}

pub(crate) fn insight_error_to_status(err: &InsightError) -> StatusCode {
    warn!(code = err.error_code(), retryable = err.retryable(), error = %err, "chat: insight failed");
    match err {
        InsightError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        InsightError::InvalidRequest(_) | InsightError::UnreadableBody(_) => StatusCode::BAD_REQUEST,
        InsightError::Llm(_) => StatusCode::BAD_GATEWAY,
    }
}

fn store_error_to_status(err: StoreError) -> StatusCode {
    warn!(code = err.error_code(), error = %err, "chat: session store failed");
    match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
