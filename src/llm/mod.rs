//! LLM: thin clients for the two chat providers.
//!
//! DESIGN
//! ======
//! Each provider gets its own client module with a pure `parse_response`
//! for testability. Clients speak only single-turn prompts and return a
//! provider-neutral [`types::Completion`]; prompt construction and answer
//! interpretation live in `services/`. Both clients implement [`LlmChat`]
//! so services hold `Arc<dyn LlmChat>` and tests substitute mocks.

pub mod anthropic;
pub mod config;
pub mod gemini;
pub mod types;

use std::time::Duration;

use config::LlmTimeouts;
pub use types::LlmChat;
use types::LlmError;

/// Build the shared reqwest client with request and connect timeouts.
///
/// # Errors
///
/// Returns [`LlmError::HttpClientBuild`] if the TLS backend fails to
/// initialize.
pub(crate) fn build_http(timeouts: LlmTimeouts) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| LlmError::HttpClientBuild(e.to_string()))
}

/// Read a provider response, turning transport failures and non-200
/// statuses into errors.
pub(crate) async fn read_body(response: reqwest::Response) -> Result<String, LlmError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

    if status != 200 {
        return Err(LlmError::ApiResponse { status, body: text });
    }
    Ok(text)
}
