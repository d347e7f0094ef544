//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the process-wide services built once at startup: the database pool,
//! the optional LLM client, the chat session store, and the admin list.
//! None of them carry per-request mutable state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::llm::LlmChat;
use crate::services::auth::AdminConfig;
use crate::services::chat_store::ChatSessionStore;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Optional LLM client. `None` if `GEMINI_API_KEY` is not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    pub sessions: Arc<dyn ChatSessionStore>,
    pub admins: Arc<AdminConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(
        pool: PgPool,
        llm: Option<Arc<dyn LlmChat>>,
        sessions: Arc<dyn ChatSessionStore>,
        admins: AdminConfig,
    ) -> Self {
        Self { pool, llm, sessions, admins: Arc::new(admins) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
