//! Insight service: article question answering through the LLM.
//!
//! DESIGN
//! ======
//! Stateless: one request in, exactly one upstream call out. The article,
//! the prior transcript and the new question are flattened into a single
//! prompt ending in an `Assistant:` cue. An upstream success with no usable
//! text is answered with a fixed apology instead of an error.
//!
//! This module never reads or writes chat sessions; callers persist the
//! exchange themselves (see `chat_session`).

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::chat_store::{ChatMessage, ChatRole};
use crate::llm::LlmChat;
use crate::llm::types::LlmError;

pub const FALLBACK_RESPONSE: &str = "I'm sorry, I couldn't generate a response. Please try again.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("{} is not configured", crate::llm::config::API_KEY_VAR)]
    NotConfigured,
    #[error("invalid request body: {0}")]
    InvalidRequest(#[from] serde_json::Error),
    #[error("unreadable request body: {0}")]
    UnreadableBody(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl crate::error::ErrorCode for InsightError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::InvalidRequest(_) | Self::UnreadableBody(_) => "E_INVALID_REQUEST",
            Self::Llm(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Llm(e) if e.retryable())
    }
}

/// Proxy request body. Field names follow the browser client.
#[derive(Debug, Clone, Deserialize)]
pub struct InsightRequest {
    pub message: String,
    #[serde(default, rename = "blogTitle", alias = "articleTitle")]
    pub article_title: String,
    #[serde(default, rename = "blogContent", alias = "articleContent")]
    pub article_content: String,
    #[serde(default, rename = "conversationHistory", alias = "history")]
    pub history: Option<Vec<HistoryTurn>>,
}

/// One prior transcript entry as the prompt needs it. Only `type` and
/// `content` are read; any `type` other than `user` counts as the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTurn")]
pub struct HistoryTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Deserialize)]
struct RawTurn {
    #[serde(default, rename = "type")]
    kind: serde_json::Value,
    #[serde(default)]
    content: serde_json::Value,
}

impl From<RawTurn> for HistoryTurn {
    fn from(raw: RawTurn) -> Self {
        let role = if raw.kind.as_str() == Some("user") { ChatRole::User } else { ChatRole::Assistant };
        let content = match raw.content {
            serde_json::Value::String(text) => text,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        Self { role, content }
    }
}

impl From<&ChatMessage> for HistoryTurn {
    fn from(msg: &ChatMessage) -> Self {
        Self { role: msg.role, content: msg.content.clone() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightResponse {
    pub response: String,
}

// =============================================================================
// PROMPT
// =============================================================================

/// Assemble the single prompt sent upstream.
pub(crate) fn build_prompt(title: &str, content: &str, history: &[HistoryTurn], message: &str) -> String {
    let mut prompt = format!(
        "\nYou are an AI assistant helping users understand a blog post titled: \"{title}\"\n\n\
         Blog Content:\n{content}\n\n\
         Instructions:\n\
         - Answer questions about the blog content\n\
         - Provide explanations and clarifications\n\
         - Give practical examples when helpful\n\
         - Be concise but informative\n\
         - If asked about something not in the blog, politely redirect to the blog topic\n\
         - Use a friendly, educational tone\n\
         \n\nConversation:\n"
    );

    for turn in history {
        let _ = writeln!(prompt, "{}: {}", turn.role.prompt_label(), turn.content);
    }

    let _ = write!(prompt, "User: {message}\nAssistant:");
    prompt
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Answer one question about an article.
///
/// # Errors
///
/// Returns [`InsightError::Llm`] when the upstream call fails or its payload
/// cannot be parsed. An empty answer is not an error.
pub async fn generate_insight(llm: &dyn LlmChat, request: &InsightRequest) -> Result<String, InsightError> {
    let history = request.history.as_deref().unwrap_or_default();
    let prompt = build_prompt(&request.article_title, &request.article_content, history, &request.message);

    info!(
        title = %request.article_title,
        history_len = history.len(),
        prompt_len = prompt.len(),
        "insight: forwarding prompt"
    );

    let response = llm.chat(&prompt).await?;

    info!(
        model = %response.model,
        finish_reason = response.finish_reason.as_deref().unwrap_or("none"),
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        has_text = response.text.as_deref().is_some_and(|t| !t.is_empty()),
        "insight: upstream response"
    );

    Ok(response
        .text
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| FALLBACK_RESPONSE.to_owned()))
}

#[cfg(test)]
#[path = "insight_test.rs"]
mod tests;
