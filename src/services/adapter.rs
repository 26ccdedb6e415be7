//! Provider adapter: one LLM client behind the assistant traits.
//!
//! DESIGN
//! ======
//! The adapter owns the credential check, prompt construction, the client
//! call and response interpretation for a single provider. Every outcome,
//! including transport errors, leaves as a value: a chart request becomes a
//! [`ChatResponse`], a slide request becomes `Option`. A provider without an
//! API key holds no client at all, so it fails fast without a network call.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::chart::{ChartConfiguration, ChartData};
use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::anthropic::AnthropicClient;
use crate::llm::config::{ANTHROPIC_KEY_VAR, AiConfig, GEMINI_KEY_VAR};
use crate::llm::gemini::GeminiClient;
use crate::llm::types::{ChatRequest, Completion, LlmError};
use crate::services::assistant::{ChartAssistant, ChatResponse, FailureKind, SlideAssistant};
use crate::services::parse::{parse_action_title_response, parse_ai_response, parse_slide_response, parse_units_response};
use crate::services::prompt::{
    build_action_title_prompt, build_chart_modification_prompt, build_slide_generation_prompt,
    build_units_inference_prompt,
};
use crate::services::slides::{ActionTitle, SlideDraft, SlideInsight};

pub struct ProviderAdapter {
    provider: &'static str,
    key_var: &'static str,
    client: Option<Arc<dyn LlmChat>>,
    max_tokens: u32,
}

impl ProviderAdapter {
    #[must_use]
    pub fn new(
        provider: &'static str,
        key_var: &'static str,
        client: Option<Arc<dyn LlmChat>>,
        max_tokens: u32,
    ) -> Self {
        Self { provider, key_var, client, max_tokens }
    }

    /// Claude adapter over the Anthropic Messages API.
    #[must_use]
    pub fn claude(config: &AiConfig) -> Self {
        let client = AnthropicClient::new(&config.anthropic, config.timeouts, config.web_search_max_uses);
        Self::new("Claude", ANTHROPIC_KEY_VAR, usable_client("Claude", client), config.max_tokens)
    }

    /// Gemini adapter over `generateContent`.
    #[must_use]
    pub fn gemini(config: &AiConfig) -> Self {
        let client = GeminiClient::new(&config.gemini, config.timeouts);
        Self::new("Gemini", GEMINI_KEY_VAR, usable_client("Gemini", client), config.max_tokens)
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn not_configured_message(&self) -> String {
        format!("{} API key is not configured. Please add {} to your .env file.", self.provider, self.key_var)
    }

    fn request_failed_message(&self) -> String {
        format!("{} API request failed. Trying fallback provider...", self.provider)
    }

    async fn complete(
        &self,
        client: &dyn LlmChat,
        prompt: &str,
        web_search: bool,
        operation: &'static str,
    ) -> Result<Completion, LlmError> {
        debug!(provider = self.provider, operation, prompt_len = prompt.len(), web_search, "llm: sending request");
        let request = ChatRequest { prompt, max_tokens: self.max_tokens, web_search };
        match client.chat(&request).await {
            Ok(completion) => {
                info!(
                    provider = self.provider,
                    operation,
                    model = %completion.model,
                    input_tokens = completion.input_tokens,
                    output_tokens = completion.output_tokens,
                    response_len = completion.text.len(),
                    sources = completion.sources.len(),
                    "llm: completion received"
                );
                Ok(completion)
            }
            Err(e) => {
                warn!(
                    provider = self.provider,
                    operation,
                    model = client.model(),
                    code = e.error_code(),
                    retryable = e.retryable(),
                    error = %e,
                    "llm: request failed"
                );
                Err(e)
            }
        }
    }

    /// Plain-text completion for slide work; web search is never attached.
    async fn complete_text(&self, prompt: &str, operation: &'static str) -> Option<String> {
        let Some(client) = &self.client else {
            debug!(provider = self.provider, operation, "llm: provider not configured");
            return None;
        };
        self.complete(client.as_ref(), prompt, false, operation)
            .await
            .ok()
            .map(|completion| completion.text)
    }
}

/// Keep a constructed client; a missing key or a broken HTTP stack leaves
/// the provider unconfigured.
fn usable_client<C: LlmChat + 'static>(provider: &str, client: Result<C, LlmError>) -> Option<Arc<dyn LlmChat>> {
    match client {
        Ok(client) => Some(Arc::new(client)),
        Err(LlmError::MissingApiKey { var }) => {
            info!(provider, %var, "llm: provider not configured");
            None
        }
        Err(e) => {
            error!(provider, code = e.error_code(), error = %e, "llm: client construction failed");
            None
        }
    }
}

#[async_trait]
impl ChartAssistant for ProviderAdapter {
    fn name(&self) -> &str {
        self.provider
    }

    async fn modify_chart(&self, config: &ChartConfiguration, message: &str, use_web_search: bool) -> ChatResponse {
        let Some(client) = &self.client else {
            return ChatResponse::failure(FailureKind::NotConfigured, self.not_configured_message());
        };

        let prompt = build_chart_modification_prompt(config, message, use_web_search);
        match self
            .complete(client.as_ref(), &prompt, use_web_search, "modify_chart")
            .await
        {
            Ok(completion) => parse_ai_response(config, &completion.text, use_web_search, &completion.sources),
            Err(_) => ChatResponse::failure(FailureKind::RequestFailed, self.request_failed_message()),
        }
    }
}

#[async_trait]
impl SlideAssistant for ProviderAdapter {
    async fn slide_draft(&self, data: &ChartData) -> Option<SlideDraft> {
        let text = self
            .complete_text(&build_slide_generation_prompt(data), "slide_draft")
            .await?;
        parse_slide_response(&text)
    }

    async fn action_title(&self, insights: &[SlideInsight], data: &ChartData) -> Option<ActionTitle> {
        let text = self
            .complete_text(&build_action_title_prompt(insights, data), "action_title")
            .await?;
        parse_action_title_response(&text)
    }

    async fn infer_units(&self, data: &ChartData) -> Option<String> {
        let text = self
            .complete_text(&build_units_inference_prompt(data), "infer_units")
            .await?;
        parse_units_response(&text)
    }
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;
