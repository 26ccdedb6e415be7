//! Chat session routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::services::chat::{ChatError, Feedback, Message};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
    pub is_loading: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    pub content: String,
    #[serde(default)]
    pub use_web_search: bool,
}

#[derive(Deserialize)]
pub struct FeedbackBody {
    pub feedback: Feedback,
}

/// `GET /api/chat/messages`: message log and loading flag.
pub async fn list_messages(State(state): State<AppState>) -> Json<MessagesResponse> {
    Json(MessagesResponse { messages: state.chat.messages().await, is_loading: state.chat.is_loading() })
}

/// `POST /api/chat/messages`: send a message, wait for the assistant reply.
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<Message>, ApiError> {
    let reply = state
        .chat
        .send_message(&body.content, body.use_web_search)
        .await
        .map_err(chat_error_to_api)?;
    Ok(Json(reply))
}

/// `POST /api/chat/retry`: resend the last user message.
pub async fn retry_last_message(State(state): State<AppState>) -> Result<Json<Message>, ApiError> {
    let reply = state
        .chat
        .retry_last_message()
        .await
        .map_err(chat_error_to_api)?;
    Ok(Json(reply))
}

/// `POST /api/chat/messages/:index/feedback`: rate a message.
pub async fn set_feedback(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(body): Json<FeedbackBody>,
) -> Result<StatusCode, ApiError> {
    state
        .chat
        .set_feedback(index, body.feedback)
        .await
        .map_err(chat_error_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/chat/messages`: clear the log.
pub async fn clear_messages(State(state): State<AppState>) -> StatusCode {
    state.chat.clear().await;
    StatusCode::NO_CONTENT
}

pub(crate) fn chat_error_to_api(err: ChatError) -> ApiError {
    let status = match err {
        ChatError::Busy | ChatError::EmptyMessage | ChatError::NothingToRetry => StatusCode::CONFLICT,
        ChatError::MessageNotFound(_) => StatusCode::NOT_FOUND,
    };
    ApiError::new(status, &err)
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
