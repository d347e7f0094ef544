//! LLM: upstream generative-language adapter for article insights.
//!
//! DESIGN
//! ======
//! Configuration comes from environment variables. `LlmClient` owns the
//! Gemini HTTP client and the model name and implements [`LlmChat`], which is
//! the seam the insight service and its tests depend on.

pub mod config;
pub mod gemini;
pub mod types;

use config::LlmConfig;
pub use types::LlmChat;
use types::{ChatResponse, LlmError};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete LLM client backed by the Gemini `generateContent` API.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: gemini::GeminiClient,
    model: String,
}

impl LlmClient {
    /// Build an LLM client from environment variables when a key is set.
    ///
    /// An unset or blank key yields `Ok(None)`: the service runs with AI
    /// insights disabled.
    ///
    /// # Errors
    ///
    /// Returns an error if another setting is invalid or the HTTP client
    /// fails to build.
    pub fn from_env() -> Result<Option<Self>, LlmError> {
        Self::from_config_result(LlmConfig::from_env())
    }

    fn from_config_result(config: Result<LlmConfig, LlmError>) -> Result<Option<Self>, LlmError> {
        match config {
            Ok(config) => Self::from_config(config).map(Some),
            Err(LlmError::MissingApiKey { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = gemini::GeminiClient::new(config.api_key, config.base_url, config.timeouts)?;
        Ok(Self { inner, model: config.model })
    }

    /// Return the configured model name (e.g. `"gemini-2.0-flash"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, prompt: &str) -> Result<ChatResponse, LlmError> {
        self.inner.generate(&self.model, prompt).await
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
