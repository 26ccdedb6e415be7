//! LLM types: provider-neutral request/response types and errors.
//!
//! Both clients translate their native wire shapes into [`Completion`] before
//! returning, so nothing above `llm/` knows whether an answer came from
//! Anthropic or Gemini.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The LLM provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// The provider answered but produced no text.
    #[error("API response contained no text")]
    EmptyResponse,
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey { .. } => "E_MISSING_API_KEY",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::EmptyResponse => "E_EMPTY_RESPONSE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// WEB SOURCES
// =============================================================================

/// A citation for data the model found through web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Drop sources whose URL was already seen, keeping first occurrences in
/// order.
#[must_use]
pub fn dedup_sources(sources: Vec<WebSource>) -> Vec<WebSource> {
    let mut seen: Vec<String> = Vec::with_capacity(sources.len());
    sources
        .into_iter()
        .filter(|source| {
            if seen.contains(&source.url) {
                return false;
            }
            seen.push(source.url.clone());
            true
        })
        .collect()
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// A single-turn prompt sent to a provider.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub prompt: &'a str,
    pub max_tokens: u32,
    /// Attach the provider's web-search capability to this request.
    pub web_search: bool,
}

/// Normalized answer from an LLM chat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// The final answer text. Intermediate narration around tool calls is
    /// already stripped.
    pub text: String,
    /// Web-search citations the provider reported, deduplicated by URL.
    pub sources: Vec<WebSource>,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// LLM CHAT TRAIT
// =============================================================================

/// Provider-neutral async trait for LLM chat. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// Model name sent with every request.
    fn model(&self) -> &str;

    /// Send a single-turn prompt to the provider.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails, the provider rejects it,
    /// or the response is malformed or empty.
    async fn chat(&self, request: &ChatRequest<'_>) -> Result<Completion, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
