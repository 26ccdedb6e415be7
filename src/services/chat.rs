//! Chat session manager: message log, loading gate, and the commit step.
//!
//! DESIGN
//! ======
//! One session owns an ordered message log and a single in-flight gate. A
//! send appends the user message, snapshots the store, asks the chart
//! assistant under a deadline, and commits the answer only if the store is
//! still at the snapshot's version. The gate is released by a drop guard, so
//! every exit path (including a cancelled request future) clears it.
//!
//! No store lock is held while the assistant runs; manual edits proceed
//! freely and turn a late AI answer into a rejected commit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::llm::types::WebSource;
use crate::services::assistant::{ChartAssistant, ChatResponse, FailureKind, MALFORMED_RESPONSE_MESSAGE};
use crate::state::{ChartStore, StoreError};

pub const TIMEOUT_MESSAGE: &str = "The AI request timed out. Please try again.";
pub const STALE_MESSAGE: &str =
    "The chart changed while the assistant was working, so its update was discarded. Please try again.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<WebSource>,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), is_error: false, feedback: None, sources: Vec::new() }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>, sources: Vec<WebSource>) -> Self {
        Self { role: Role::Assistant, content: content.into(), is_error: false, feedback: None, sources }
    }

    #[must_use]
    pub fn error(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), is_error: true, feedback: None, sources: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("a request is already in progress")]
    Busy,
    #[error("message is empty")]
    EmptyMessage,
    #[error("no user message to retry")]
    NothingToRetry,
    #[error("no message at index {0}")]
    MessageNotFound(usize),
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy => "E_CHAT_BUSY",
            Self::EmptyMessage => "E_EMPTY_MESSAGE",
            Self::NothingToRetry => "E_NOTHING_TO_RETRY",
            Self::MessageNotFound(_) => "E_MESSAGE_NOT_FOUND",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Holds the session's in-flight flag; clears it on drop.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// SESSION
// =============================================================================

pub struct ChatSession {
    assistant: Arc<dyn ChartAssistant>,
    store: ChartStore,
    messages: RwLock<Vec<Message>>,
    loading: AtomicBool,
    deadline: Duration,
}

impl ChatSession {
    #[must_use]
    pub fn new(assistant: Arc<dyn ChartAssistant>, store: ChartStore, deadline: Duration) -> Self {
        Self { assistant, store, messages: RwLock::new(Vec::new()), loading: AtomicBool::new(false), deadline }
    }

    /// Send a user message and return the assistant's reply, which is also
    /// appended to the log.
    ///
    /// # Errors
    ///
    /// [`ChatError::EmptyMessage`] for blank content and [`ChatError::Busy`]
    /// while another request is in flight. Neither touches the log.
    pub async fn send_message(&self, content: &str, use_web_search: bool) -> Result<Message, ChatError> {
        if content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let _guard = LoadingGuard::acquire(&self.loading).ok_or(ChatError::Busy)?;

        self.messages.write().await.push(Message::user(content));
        Ok(self.run_exchange(content, use_web_search).await)
    }

    /// Drop a trailing error reply and ask again with the last user text.
    /// Web search is not used on retry.
    ///
    /// # Errors
    ///
    /// [`ChatError::Busy`] while a request is in flight and
    /// [`ChatError::NothingToRetry`] when the log has no user message.
    pub async fn retry_last_message(&self) -> Result<Message, ChatError> {
        let _guard = LoadingGuard::acquire(&self.loading).ok_or(ChatError::Busy)?;

        let content = {
            let mut messages = self.messages.write().await;
            let content = messages
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.clone())
                .ok_or(ChatError::NothingToRetry)?;
            if messages.last().is_some_and(|m| m.is_error) {
                messages.pop();
            }
            if messages.last().is_none_or(|m| m.role != Role::User) {
                messages.push(Message::user(content.as_str()));
            }
            content
        };

        info!(content_len = content.len(), "chat: retrying last message");
        Ok(self.run_exchange(&content, false).await)
    }

    async fn run_exchange(&self, content: &str, use_web_search: bool) -> Message {
        let request_id = Uuid::new_v4();
        let base = self.store.snapshot().await;
        info!(
            %request_id,
            assistant = self.assistant.name(),
            web_search = use_web_search,
            version = base.version,
            content_len = content.len(),
            "chat: request started"
        );

        let response = match tokio::time::timeout(
            self.deadline,
            self.assistant
                .modify_chart(&base.configuration, content, use_web_search),
        )
        .await
        {
            Ok(response) => response,
            Err(_) => {
                warn!(%request_id, deadline_secs = self.deadline.as_secs_f64(), "chat: assistant deadline expired");
                ChatResponse::failure(FailureKind::TimedOut, TIMEOUT_MESSAGE)
            }
        };

        let reply = match response {
            ChatResponse::Success { configuration, message, sources } => {
                match self
                    .store
                    .commit_ai_update(base.version, configuration, sources.clone())
                    .await
                {
                    Ok(snapshot) => {
                        info!(%request_id, version = snapshot.version, sources = sources.len(), "chat: configuration committed");
                        Message::assistant(message, sources)
                    }
                    Err(e) => {
                        warn!(%request_id, code = e.error_code(), error = %e, "chat: commit rejected");
                        match e {
                            StoreError::Stale { .. } => Message::error(STALE_MESSAGE),
                            StoreError::Chart(_) => Message::error(MALFORMED_RESPONSE_MESSAGE),
                        }
                    }
                }
            }
            ChatResponse::Failure { kind, message } => {
                warn!(%request_id, ?kind, "chat: assistant failed");
                Message::error(message)
            }
        };

        self.messages.write().await.push(reply.clone());
        reply
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Attach feedback to the message at `index`.
    ///
    /// # Errors
    ///
    /// [`ChatError::MessageNotFound`] when `index` is out of range.
    pub async fn set_feedback(&self, index: usize, feedback: Feedback) -> Result<(), ChatError> {
        let mut messages = self.messages.write().await;
        let message = messages
            .get_mut(index)
            .ok_or(ChatError::MessageNotFound(index))?;
        message.feedback = Some(feedback);
        Ok(())
    }

    pub async fn clear(&self) {
        self.messages.write().await.clear();
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
