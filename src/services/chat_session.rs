//! Chat session binding on the caller side of the insight exchange.
//!
//! DESIGN
//! ======
//! A transcript starts `Unbound` (no persisted session yet) or `Bound` to the
//! latest stored session for its (user, article) pair. `persist` is the
//! idempotent "ensure bound" step: an unbound transcript creates its session
//! and binds to the returned id, a bound one overwrites its messages.
//!
//! ERROR HANDLING
//! ==============
//! A failed upstream call keeps the user's question in the transcript and
//! returns the error. A failed persist is logged and reported as
//! `persisted = false`; the answer is still returned.

use tracing::{info, warn};
use uuid::Uuid;

use super::chat_store::{ChatMessage, ChatSessionStore, StoreError};
use super::insight::{self, HistoryTurn, InsightError, InsightRequest};
use crate::error::ErrorCode;
use crate::llm::LlmChat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBinding {
    Unbound,
    Bound(Uuid),
}

/// Article text the assistant answers about.
#[derive(Debug, Clone)]
pub struct ArticleContext {
    pub title: String,
    pub content: String,
}

/// In-memory transcript for one (user, article) pair plus its binding.
#[derive(Debug, Clone)]
pub struct ChatTranscript {
    user_id: Uuid,
    article_id: Uuid,
    binding: SessionBinding,
    messages: Vec<ChatMessage>,
}

impl ChatTranscript {
    #[must_use]
    pub fn new(user_id: Uuid, article_id: Uuid) -> Self {
        Self { user_id, article_id, binding: SessionBinding::Unbound, messages: Vec::new() }
    }

    /// Load the latest stored session for the pair, or start unbound.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the lookup fails.
    pub async fn open(store: &dyn ChatSessionStore, user_id: Uuid, article_id: Uuid) -> Result<Self, StoreError> {
        let Some(session) = store.find_latest_session(user_id, article_id).await? else {
            return Ok(Self::new(user_id, article_id));
        };
        Ok(Self { user_id, article_id, binding: SessionBinding::Bound(session.id), messages: session.messages })
    }

    #[must_use]
    pub fn binding(&self) -> SessionBinding {
        self.binding
    }

    #[must_use]
    pub fn session_id(&self) -> Option<Uuid> {
        match self.binding {
            SessionBinding::Bound(id) => Some(id),
            SessionBinding::Unbound => None,
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Append a completed question/answer pair.
    pub fn record_exchange(&mut self, question: ChatMessage, answer: ChatMessage) {
        self.messages.push(question);
        self.messages.push(answer);
    }

    /// Ensure the transcript is bound and write it to the store.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the create or update fails; the binding
    /// is left unchanged in that case.
    pub async fn persist(&mut self, store: &dyn ChatSessionStore) -> Result<Uuid, StoreError> {
        match self.binding {
            SessionBinding::Bound(id) => {
                store.update_session(id, &self.messages).await?;
                Ok(id)
            }
            SessionBinding::Unbound => {
                let session = store
                    .create_session(self.user_id, self.article_id, &self.messages)
                    .await?;
                info!(session_id = %session.id, user_id = %self.user_id, article_id = %self.article_id, "chat: session created");
                self.binding = SessionBinding::Bound(session.id);
                Ok(session.id)
            }
        }
    }
}

/// Result of one question/answer round.
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    pub response: String,
    pub session_id: Option<Uuid>,
    pub persisted: bool,
}

/// Ask one question about `article`, append the exchange, and persist it.
///
/// # Errors
///
/// Returns an [`InsightError`] when the upstream call fails. The question is
/// still appended to `transcript` in that case.
pub async fn ask(
    llm: &dyn LlmChat,
    store: &dyn ChatSessionStore,
    article: &ArticleContext,
    transcript: &mut ChatTranscript,
    question: &str,
) -> Result<ExchangeOutcome, InsightError> {
    let request = InsightRequest {
        message: question.to_owned(),
        article_title: article.title.clone(),
        article_content: article.content.clone(),
        history: Some(transcript.messages().iter().map(HistoryTurn::from).collect()),
    };
    let user_message = ChatMessage::user(question);

    let response = match insight::generate_insight(llm, &request).await {
        Ok(text) => text,
        Err(e) => {
            transcript.push(user_message);
            return Err(e);
        }
    };

    transcript.record_exchange(user_message, ChatMessage::assistant(response.clone()));

    let persisted = match transcript.persist(store).await {
        Ok(_) => true,
        Err(e) => {
            warn!(code = e.error_code(), error = %e, article_id = %transcript.article_id, "chat: failed to save session");
            false
        }
    };

    Ok(ExchangeOutcome { response, session_id: transcript.session_id(), persisted })
}

#[cfg(test)]
#[path = "chat_session_test.rs"]
mod tests;
