//! Fallback orchestrator: primary assistant, then secondary.
//!
//! No retries and no backoff: each request asks the primary once and, only
//! if that fails for any reason, the secondary once with identical
//! arguments. The decision is made fresh per request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::chart::{ChartConfiguration, ChartData};
use crate::services::assistant::{ChartAssistant, ChatResponse, EXHAUSTED_MESSAGE, FailureKind, SlideAssistant};
use crate::services::slides::{ActionTitle, SlideDraft, SlideInsight};

pub struct FallbackAssistant<A: ?Sized> {
    primary: Arc<A>,
    secondary: Arc<A>,
}

impl<A: ?Sized> FallbackAssistant<A> {
    #[must_use]
    pub fn new(primary: Arc<A>, secondary: Arc<A>) -> Self {
        Self { primary, secondary }
    }
}

fn log_primary_failure(primary: &str, secondary: &str, response: &ChatResponse) {
    match response {
        ChatResponse::Failure { kind: FailureKind::NotConfigured, .. } => {
            info!(primary, secondary, "fallback: primary not configured, trying secondary");
        }
        ChatResponse::Failure { kind, .. } => {
            warn!(primary, secondary, ?kind, "fallback: primary failed, trying secondary");
        }
        ChatResponse::Success { .. } => {}
    }
}

#[async_trait]
impl ChartAssistant for FallbackAssistant<dyn ChartAssistant> {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn modify_chart(&self, config: &ChartConfiguration, message: &str, use_web_search: bool) -> ChatResponse {
        let first = self
            .primary
            .modify_chart(config, message, use_web_search)
            .await;
        if first.is_success() {
            return first;
        }
        log_primary_failure(self.primary.name(), self.secondary.name(), &first);

        let second = self
            .secondary
            .modify_chart(config, message, use_web_search)
            .await;
        if second.is_success() {
            return second;
        }

        warn!(
            primary = self.primary.name(),
            secondary = self.secondary.name(),
            primary_message = first.message(),
            secondary_message = second.message(),
            "fallback: all providers failed"
        );
        ChatResponse::failure(FailureKind::Exhausted, EXHAUSTED_MESSAGE)
    }
}

#[async_trait]
impl SlideAssistant for FallbackAssistant<dyn SlideAssistant> {
    async fn slide_draft(&self, data: &ChartData) -> Option<SlideDraft> {
        if let Some(draft) = self.primary.slide_draft(data).await {
            return Some(draft);
        }
        info!("fallback: primary slide draft unavailable, trying secondary");
        self.secondary.slide_draft(data).await
    }

    async fn action_title(&self, insights: &[SlideInsight], data: &ChartData) -> Option<ActionTitle> {
        if let Some(title) = self.primary.action_title(insights, data).await {
            return Some(title);
        }
        info!("fallback: primary action title unavailable, trying secondary");
        self.secondary.action_title(insights, data).await
    }

    async fn infer_units(&self, data: &ChartData) -> Option<String> {
        if let Some(units) = self.primary.infer_units(data).await {
            return Some(units);
        }
        info!("fallback: primary units unavailable, trying secondary");
        self.secondary.infer_units(data).await
    }
}

#[cfg(test)]
#[path = "fallback_test.rs"]
mod tests;
