//! Anthropic Messages API client.
//!
//! Thin HTTP wrapper for `/v1/messages`. Pure parsing in `parse_response`
//! for testability.
//!
//! With web search on, the response interleaves narration `text` blocks with
//! `server_tool_use` and `web_search_tool_result` blocks. Only the last text
//! block is the answer; earlier ones are commentary between searches.

use super::config::{LlmTimeouts, ProviderConfig};
use super::types::{ChatRequest, Completion, LlmChat, LlmError, WebSource, dedup_sources};

const API_VERSION: &str = "2023-06-01";
const WEB_SEARCH_TOOL: &str = "web_search_20250305";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
    web_search_max_uses: u32,
}

impl AnthropicClient {
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] when no key is configured, or
    /// [`LlmError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &ProviderConfig, timeouts: LlmTimeouts, web_search_max_uses: u32) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::MissingApiKey { var: super::config::ANTHROPIC_KEY_VAR.into() })?;
        Ok(Self {
            http: super::build_http(timeouts)?,
            api_key,
            model: config.model.clone(),
            url: format!("{}/v1/messages", config.base_url),
            web_search_max_uses,
        })
    }
}

#[async_trait::async_trait]
impl LlmChat for AnthropicClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: &ChatRequest<'_>) -> Result<Completion, LlmError> {
        let tools = request.web_search.then(|| {
            vec![WebSearchTool { kind: WEB_SEARCH_TOOL, name: "web_search", max_uses: self.web_search_max_uses }]
        });
        let body = ApiRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages: vec![ApiMessage { role: "user", content: request.prompt }],
            tools,
        };

        let response = self
            .http
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let text = super::read_body(response).await?;
        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WebSearchTool>>,
}

#[derive(serde::Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(serde::Serialize)]
struct WebSearchTool {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
    max_uses: u32,
}

#[derive(serde::Deserialize)]
struct ApiResponse {
    content: Vec<ResponseBlock>,
    model: String,
    #[serde(default)]
    usage: Usage,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    WebSearchToolResult {
        content: SearchResultContent,
    },
    /// `server_tool_use`, `tool_use`, `thinking`, and future block types.
    #[serde(other)]
    Unknown,
}

/// A search result block holds either results or an error object.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum SearchResultContent {
    Results(Vec<SearchResult>),
    Error(serde::de::IgnoredAny),
}

#[derive(serde::Deserialize)]
struct SearchResult {
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    page_age: Option<String>,
}

#[derive(Default, serde::Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_response(json: &str) -> Result<Completion, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let text = final_text(&api.content).ok_or(LlmError::EmptyResponse)?;
    let sources = search_sources(&api.content);

    Ok(Completion {
        text,
        sources,
        model: api.model,
        input_tokens: api.usage.input_tokens,
        output_tokens: api.usage.output_tokens,
    })
}

/// The last non-blank run of consecutive text blocks, joined.
///
/// Answers that cite search results arrive split into several text blocks
/// around each cited span; any other block type ends a run.
fn final_text(blocks: &[ResponseBlock]) -> Option<String> {
    let mut runs: Vec<String> = Vec::new();
    let mut in_run = false;
    for block in blocks {
        match block {
            ResponseBlock::Text { text } => {
                match runs.last_mut() {
                    Some(run) if in_run => run.push_str(text),
                    _ => runs.push(text.clone()),
                }
                in_run = true;
            }
            _ => in_run = false,
        }
    }
    runs.into_iter().rev().find(|run| !run.trim().is_empty())
}

fn search_sources(blocks: &[ResponseBlock]) -> Vec<WebSource> {
    let sources = blocks
        .iter()
        .filter_map(|block| match block {
            ResponseBlock::WebSearchToolResult { content: SearchResultContent::Results(results) } => Some(results),
            _ => None,
        })
        .flatten()
        .filter(|result| !result.url.is_empty())
        .map(|result| WebSource {
            title: if result.title.is_empty() { result.url.clone() } else { result.title.clone() },
            url: result.url.clone(),
            description: result.page_age.clone(),
        })
        .collect();
    dedup_sources(sources)
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
