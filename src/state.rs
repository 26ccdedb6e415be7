//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the chart store, the chat session and the slide service, all
//! constructed explicitly at startup (or by tests with stub assistants).
//!
//! The [`ChartStore`] is the single owner of the live configuration. Every
//! change replaces the configuration wholesale and bumps a monotonic
//! version. AI updates carry the version they were computed from and are
//! rejected if a manual edit landed in between, so a slow assistant can no
//! longer silently overwrite a newer configuration.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::chart::{ChartAction, ChartConfiguration, ChartError, SeriesLayout};
use crate::error::ErrorCode;
use crate::llm::config::AiConfig;
use crate::llm::types::WebSource;
use crate::services::adapter::ProviderAdapter;
use crate::services::assistant::{ChartAssistant, SlideAssistant};
use crate::services::chat::ChatSession;
use crate::services::fallback::FallbackAssistant;
use crate::services::slides::SlideService;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("stale update: computed from version {expected}, store is at {actual}")]
    Stale { expected: u64, actual: u64 },
    #[error(transparent)]
    Chart(#[from] ChartError),
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Stale { .. } => "E_STALE_VERSION",
            Self::Chart(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

// =============================================================================
// CHART STORE
// =============================================================================

/// Read model of the store at one version.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSnapshot {
    pub version: u64,
    pub configuration: ChartConfiguration,
    /// Series with defaults resolved; derived from `configuration`.
    pub series: Vec<SeriesLayout>,
    /// Citations for the data of the last AI update.
    pub sources: Vec<WebSource>,
}

struct ChartState {
    configuration: ChartConfiguration,
    version: u64,
    sources: Vec<WebSource>,
}

impl ChartState {
    fn snapshot(&self) -> ChartSnapshot {
        ChartSnapshot {
            version: self.version,
            configuration: self.configuration.clone(),
            series: self.configuration.series_layout(),
            sources: self.sources.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ChartStore {
    inner: Arc<RwLock<ChartState>>,
}

impl ChartStore {
    #[must_use]
    pub fn new(configuration: ChartConfiguration) -> Self {
        Self { inner: Arc::new(RwLock::new(ChartState { configuration, version: 0, sources: Vec::new() })) }
    }

    pub async fn snapshot(&self) -> ChartSnapshot {
        self.inner.read().await.snapshot()
    }

    /// Commit an assistant's configuration computed from `base_version`.
    ///
    /// Hidden-series entries that name no series are dropped before commit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Stale`] if the store moved past `base_version`,
    /// or [`StoreError::Chart`] if the configuration breaks an invariant.
    /// The store is unchanged on error.
    pub async fn commit_ai_update(
        &self,
        base_version: u64,
        mut configuration: ChartConfiguration,
        sources: Vec<WebSource>,
    ) -> Result<ChartSnapshot, StoreError> {
        configuration.validate()?;
        configuration.normalize_hidden_series();

        let mut state = self.inner.write().await;
        if state.version != base_version {
            return Err(StoreError::Stale { expected: base_version, actual: state.version });
        }
        state.configuration = configuration;
        state.sources = sources;
        state.version += 1;
        Ok(state.snapshot())
    }

    /// Replace the whole configuration, e.g. after a data import.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Chart`] if the configuration breaks an invariant.
    pub async fn replace(&self, mut configuration: ChartConfiguration) -> Result<ChartSnapshot, StoreError> {
        configuration.validate()?;
        configuration.normalize_hidden_series();

        let mut state = self.inner.write().await;
        state.configuration = configuration;
        state.sources.clear();
        state.version += 1;
        Ok(state.snapshot())
    }

    /// Apply a named manual edit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Chart`] if the edit names an unknown series.
    pub async fn apply(&self, action: ChartAction) -> Result<ChartSnapshot, StoreError> {
        let clears_sources = matches!(action, ChartAction::Reset);

        let mut state = self.inner.write().await;
        let mut next = state.configuration.clone();
        action.apply(&mut next)?;
        state.configuration = next;
        if clears_sources {
            state.sources.clear();
        }
        state.version += 1;
        Ok(state.snapshot())
    }
}

impl Default for ChartStore {
    fn default() -> Self {
        Self::new(ChartConfiguration::sample())
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub chart: ChartStore,
    pub chat: Arc<ChatSession>,
    pub slides: Arc<SlideService>,
}

impl AppState {
    #[must_use]
    pub fn new(
        chart: ChartStore,
        chart_assistant: Arc<dyn ChartAssistant>,
        slide_assistant: Arc<dyn SlideAssistant>,
        deadline: Duration,
    ) -> Self {
        let chat = Arc::new(ChatSession::new(chart_assistant, chart.clone(), deadline));
        let slides = Arc::new(SlideService::new(slide_assistant));
        Self { chart, chat, slides }
    }

    /// Wire both providers: Claude then Gemini for chart edits, Gemini then
    /// Claude for slides.
    #[must_use]
    pub fn from_config(config: &AiConfig) -> Self {
        let claude = Arc::new(ProviderAdapter::claude(config));
        let gemini = Arc::new(ProviderAdapter::gemini(config));
        if !claude.is_configured() && !gemini.is_configured() {
            tracing::warn!("no AI provider configured; chat requests will fail until a key is set");
        }

        let chart_assistant = Arc::new(FallbackAssistant::<dyn ChartAssistant>::new(claude.clone(), gemini.clone()));
        let slide_assistant = Arc::new(FallbackAssistant::<dyn SlideAssistant>::new(gemini, claude));

        Self::new(
            ChartStore::default(),
            chart_assistant,
            slide_assistant,
            Duration::from_secs(config.request_deadline_secs),
        )
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
