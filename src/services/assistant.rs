//! Assistant seams: the traits the chat session and slide service call.
//!
//! DESIGN
//! ======
//! Provider calls are fallible in many ways (no key, transport, garbage
//! output). None of that crosses these traits as `Err`: a chart request
//! always yields a [`ChatResponse`] value, and a slide request yields
//! `Option`, so callers branch on data instead of unwinding. Both a single
//! provider adapter and the fallback chain implement the same traits, which
//! lets them nest and lets tests substitute stubs.

use async_trait::async_trait;
use serde::Serialize;

use crate::chart::{ChartConfiguration, ChartData};
use crate::llm::types::WebSource;
use crate::services::slides::{ActionTitle, SlideDraft, SlideInsight};

pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "I had trouble understanding how to modify your chart. Could you try rephrasing your request?";
pub const EXHAUSTED_MESSAGE: &str =
    "Both AI services are unavailable. Please check your API keys in the .env file and try again.";

/// Why a chart request produced no configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// The provider has no API key; no request was sent.
    NotConfigured,
    /// Transport error, non-200 status, or an unreadable provider envelope.
    RequestFailed,
    /// The provider answered but the answer was not a usable configuration.
    Malformed,
    /// Every provider in the chain failed.
    Exhausted,
    /// The session deadline expired before any provider answered.
    TimedOut,
}

/// Outcome of a chart modification request.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatResponse {
    Success { configuration: ChartConfiguration, message: String, sources: Vec<WebSource> },
    Failure { kind: FailureKind, message: String },
}

impl ChatResponse {
    #[must_use]
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure { kind, message: message.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }
}

/// Something that can turn a natural-language request into a new chart.
#[async_trait]
pub trait ChartAssistant: Send + Sync {
    /// Short label used in logs ("Claude", "Gemini", "fallback").
    fn name(&self) -> &str;

    async fn modify_chart(&self, config: &ChartConfiguration, message: &str, use_web_search: bool) -> ChatResponse;
}

/// Something that can write slide copy for chart data. `None` means "no
/// usable answer"; callers fall through to the next source.
#[async_trait]
pub trait SlideAssistant: Send + Sync {
    async fn slide_draft(&self, data: &ChartData) -> Option<SlideDraft>;

    async fn action_title(&self, insights: &[SlideInsight], data: &ChartData) -> Option<ActionTitle>;

    async fn infer_units(&self, data: &ChartData) -> Option<String>;
}
