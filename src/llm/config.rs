//! AI configuration parsed from environment variables.
//!
//! Both providers are optional. A provider without a key is reported as "not
//! configured" by its adapter at request time; startup never fails on a
//! missing key.

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-haiku-4-5";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_AI_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_AI_WEB_SEARCH_MAX_USES: u32 = 5;
pub const DEFAULT_AI_REQUEST_DEADLINE_SECS: u64 = 180;

pub const ANTHROPIC_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const GEMINI_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// `None` when the key variable is unset or blank.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl ProviderConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub anthropic: ProviderConfig,
    pub gemini: ProviderConfig,
    pub timeouts: LlmTimeouts,
    pub max_tokens: u32,
    pub web_search_max_uses: u32,
    pub request_deadline_secs: u64,
}

impl AiConfig {
    /// Build typed AI config from environment variables.
    ///
    /// Optional:
    /// - `ANTHROPIC_API_KEY`, `ANTHROPIC_MODEL`, `ANTHROPIC_BASE_URL`
    /// - `GEMINI_API_KEY`, `GEMINI_MODEL`, `GEMINI_BASE_URL`
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    /// - `AI_MAX_TOKENS`: default 4096
    /// - `AI_WEB_SEARCH_MAX_USES`: default 5
    /// - `AI_REQUEST_DEADLINE_SECS`: default 180
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            anthropic: provider_from_env(
                ANTHROPIC_KEY_VAR,
                "ANTHROPIC_MODEL",
                DEFAULT_ANTHROPIC_MODEL,
                "ANTHROPIC_BASE_URL",
                DEFAULT_ANTHROPIC_BASE_URL,
            ),
            gemini: provider_from_env(
                GEMINI_KEY_VAR,
                "GEMINI_MODEL",
                DEFAULT_GEMINI_MODEL,
                "GEMINI_BASE_URL",
                DEFAULT_GEMINI_BASE_URL,
            ),
            timeouts: LlmTimeouts {
                request_secs: env_parse_u64("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse_u64("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
            },
            max_tokens: env_parse_u32("AI_MAX_TOKENS", DEFAULT_AI_MAX_TOKENS),
            web_search_max_uses: env_parse_u32("AI_WEB_SEARCH_MAX_USES", DEFAULT_AI_WEB_SEARCH_MAX_USES),
            request_deadline_secs: env_parse_u64("AI_REQUEST_DEADLINE_SECS", DEFAULT_AI_REQUEST_DEADLINE_SECS),
        }
    }
}

fn provider_from_env(
    key_var: &str,
    model_var: &str,
    default_model: &str,
    base_url_var: &str,
    default_base_url: &str,
) -> ProviderConfig {
    let api_key = std::env::var(key_var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let model = env_non_blank(model_var).unwrap_or_else(|| default_model.to_string());
    let base_url = env_non_blank(base_url_var)
        .unwrap_or_else(|| default_base_url.to_string())
        .trim_end_matches('/')
        .to_string();
    ProviderConfig { api_key, model, base_url }
}

/// Blank values count as unset.
fn env_non_blank(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_parse_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
