//! Error plumbing shared by services and HTTP routes.
//!
//! DESIGN
//! ======
//! Every error enum that can reach a client implements [`ErrorCode`], giving
//! it a grepable `E_*` code and a retryable flag. Routes wrap such errors in
//! [`ApiError`], which renders `{ code, message, retryable }` as JSON.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Trait for errors that carry a stable, machine-readable code.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// JSON error response returned by route handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { status, code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "code": self.code,
            "message": self.message,
            "retryable": self.retryable,
        });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("not found")]
    struct NotFound;

    impl ErrorCode for NotFound {
        fn error_code(&self) -> &'static str {
            "E_NOT_FOUND"
        }
    }

    #[test]
    fn api_error_copies_code_message_and_retryable() {
        let err = ApiError::new(StatusCode::NOT_FOUND, &NotFound);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "E_NOT_FOUND");
        assert_eq!(err.message, "not found");
        assert!(!err.retryable);
    }

    #[test]
    fn api_error_into_response_keeps_status() {
        let response = ApiError::new(StatusCode::CONFLICT, &NotFound).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
