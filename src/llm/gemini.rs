//! Gemini `generateContent` client.
//!
//! Thin HTTP wrapper for `/v1beta/models/{model}:generateContent`. Pure
//! parsing in `parse_response` for testability. Web search is Google Search
//! grounding; citations arrive in `groundingMetadata.groundingChunks` rather
//! than as content blocks.

use super::config::{LlmTimeouts, ProviderConfig};
use super::types::{ChatRequest, Completion, LlmChat, LlmError, WebSource, dedup_sources};

const DEFAULT_SOURCE_TITLE: &str = "Web Source";

// =============================================================================
// CLIENT
// =============================================================================

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] when no key is configured, or
    /// [`LlmError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &ProviderConfig, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::MissingApiKey { var: super::config::GEMINI_KEY_VAR.into() })?;
        Ok(Self {
            http: super::build_http(timeouts)?,
            api_key,
            model: config.model.clone(),
            url: format!("{}/v1beta/models/{}:generateContent", config.base_url, config.model),
        })
    }
}

#[async_trait::async_trait]
impl LlmChat for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: &ChatRequest<'_>) -> Result<Completion, LlmError> {
        let body = ApiRequest {
            contents: vec![Content { role: "user", parts: vec![Part { text: request.prompt }] }],
            tools: if request.web_search { vec![GeminiTool { google_search: GoogleSearch {} }] } else { Vec::new() },
            generation_config: GenerationConfig { max_output_tokens: request.max_tokens },
        };

        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let text = super::read_body(response).await?;
        parse_response(&text, &self.model)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(serde::Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(serde::Serialize)]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(serde::Serialize)]
struct GoogleSearch {}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: UsageMetadata,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(serde::Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    /// Thought summaries are not part of the answer.
    #[serde(default)]
    thought: bool,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(serde::Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(serde::Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Default, serde::Deserialize)]
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

fn parse_response(json: &str, fallback_model: &str) -> Result<Completion, LlmError> {
    let api: ApiResponse = serde_json::from_str(json).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let candidate = api
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::ApiParse("response has no candidates".into()))?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    let sources = candidate
        .grounding_metadata
        .map(|meta| grounding_sources(meta.grounding_chunks))
        .unwrap_or_default();

    Ok(Completion {
        text,
        sources,
        model: api.model_version.unwrap_or_else(|| fallback_model.to_string()),
        input_tokens: api.usage_metadata.prompt_token_count,
        output_tokens: api.usage_metadata.candidates_token_count,
    })
}

fn grounding_sources(chunks: Vec<GroundingChunk>) -> Vec<WebSource> {
    let sources = chunks
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            let url = web.uri.filter(|uri| !uri.is_empty())?;
            Some(WebSource {
                title: web
                    .title
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| DEFAULT_SOURCE_TITLE.to_string()),
                description: Some(url.clone()),
                url,
            })
        })
        .collect();
    dedup_sources(sources)
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
