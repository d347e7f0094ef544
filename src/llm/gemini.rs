//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper for `/models/{model}:generateContent`. Generation
//! parameters are fixed constants; callers cannot tune them per request.
//! Pure parsing in `parse_response` for testability.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::LlmTimeouts;
use super::types::{ChatResponse, LlmError};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub const TEMPERATURE: f32 = 0.7;
pub const TOP_K: u32 = 40;
pub const TOP_P: f32 = 0.95;
pub const MAX_OUTPUT_TOKENS: u32 = 1024;

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    pub async fn generate(&self, model: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/models/{model}:generateContent", self.base_url);
        let body = ApiRequest::single_prompt(prompt);

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        tracing::debug!(status = status.as_u16(), body_len = text.len(), "gemini: response received");

        if !status.is_success() {
            return Err(LlmError::ApiResponse { status: status.as_u16(), body: text });
        }

        parse_response(&text, model)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: [ApiContent<'a>; 1],
    generation_config: GenerationConfig,
}

impl<'a> ApiRequest<'a> {
    fn single_prompt(prompt: &'a str) -> Self {
        Self { contents: [ApiContent { parts: [ApiPart { text: prompt }] }], generation_config: GenerationConfig::FIXED }
    }
}

#[derive(Serialize)]
struct ApiContent<'a> {
    parts: [ApiPart<'a>; 1],
}

#[derive(Serialize)]
struct ApiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl GenerationConfig {
    const FIXED: Self =
        Self { temperature: TEMPERATURE, top_k: TOP_K, top_p: TOP_P, max_output_tokens: MAX_OUTPUT_TOKENS };
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str, requested_model: &str) -> Result<ChatResponse, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let first = api.candidates.into_iter().next();
    let finish_reason = first.as_ref().and_then(|c| c.finish_reason.clone());
    let text = first
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text);
    let (input_tokens, output_tokens) = api
        .usage_metadata
        .map_or((0, 0), |u| (u.prompt_token_count, u.candidates_token_count));

    Ok(ChatResponse {
        text,
        model: api.model_version.unwrap_or_else(|| requested_model.to_string()),
        finish_reason,
        input_tokens,
        output_tokens,
    })
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
