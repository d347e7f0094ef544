//! Chat session store: persisted AI chat transcripts.
//!
//! DESIGN
//! ======
//! One row per (user, article) in `ai_chat_sessions`, holding the whole
//! transcript as a JSONB array. Lookups always return the most recently
//! updated row; a unique index on the pair plus an upserting
//! `create_session` keeps that "latest" row the only row.
//!
//! The store sits behind [`ChatSessionStore`] so session orchestration can
//! run against an in-memory store in tests.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// MESSAGES
// =============================================================================

/// Author of a transcript entry. Serialized as the client's `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

impl ChatRole {
    /// Speaker label used when a transcript is flattened into a prompt.
    #[must_use]
    pub fn prompt_label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Locally generated identifier; unique within a transcript only.
    pub id: String,
    #[serde(rename = "type")]
    pub role: ChatRole,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content.into())
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content.into())
    }

    fn new(role: ChatRole, content: String) -> Self {
        Self { id: Uuid::new_v4().to_string(), role, content, timestamp: OffsetDateTime::now_utc() }
    }
}

// =============================================================================
// SESSIONS
// =============================================================================

/// Persisted transcript for one (user, article) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub article_id: Uuid,
    pub messages: Vec<ChatMessage>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("chat session not found: {0}")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::error::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_SESSION_NOT_FOUND",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// Storage contract for chat transcripts.
#[async_trait::async_trait]
pub trait ChatSessionStore: Send + Sync {
    /// Most recently updated session for the pair, if any.
    async fn find_latest_session(&self, user_id: Uuid, article_id: Uuid) -> Result<Option<ChatSession>, StoreError>;

    /// Create the session for the pair and assign its id.
    async fn create_session(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        messages: &[ChatMessage],
    ) -> Result<ChatSession, StoreError>;

    /// Overwrite the transcript of an existing session and refresh `updated_at`.
    async fn update_session(&self, session_id: Uuid, messages: &[ChatMessage]) -> Result<(), StoreError>;
}

// =============================================================================
// POSTGRES
// =============================================================================

type SessionRow = (Uuid, Uuid, Uuid, Json<Vec<ChatMessage>>, OffsetDateTime);

fn session_from_row((id, user_id, article_id, Json(messages), updated_at): SessionRow) -> ChatSession {
    ChatSession { id, user_id, article_id, messages, updated_at }
}

pub struct PgChatSessionStore {
    pool: PgPool,
}

impl PgChatSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ChatSessionStore for PgChatSessionStore {
    async fn find_latest_session(&self, user_id: Uuid, article_id: Uuid) -> Result<Option<ChatSession>, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"SELECT id, user_id, blog_id, messages, updated_at
              FROM ai_chat_sessions
              WHERE user_id = $1 AND blog_id = $2
              ORDER BY updated_at DESC
              LIMIT 1",
        )
        .bind(user_id)
        .bind(article_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(session_from_row))
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        article_id: Uuid,
        messages: &[ChatMessage],
    ) -> Result<ChatSession, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"INSERT INTO ai_chat_sessions (user_id, blog_id, messages)
              VALUES ($1, $2, $3)
              ON CONFLICT (user_id, blog_id)
              DO UPDATE SET messages = EXCLUDED.messages, updated_at = now()
              RETURNING id, user_id, blog_id, messages, updated_at",
        )
        .bind(user_id)
        .bind(article_id)
        .bind(Json(messages))
        .fetch_one(&self.pool)
        .await?;

        Ok(session_from_row(row))
    }

    async fn update_session(&self, session_id: Uuid, messages: &[ChatMessage]) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE ai_chat_sessions SET messages = $2, updated_at = now() WHERE id = $1")
            .bind(session_id)
            .bind(Json(messages))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(session_id));
        }
        Ok(())
    }
}

// =============================================================================
// IN-MEMORY (tests)
// =============================================================================


#[cfg(test)]
#[path = "chat_store_test.rs"]
mod tests;
