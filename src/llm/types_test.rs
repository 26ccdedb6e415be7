use super::*;
use crate::error::ErrorCode;

fn source(url: &str, title: &str) -> WebSource {
    WebSource { title: title.into(), url: url.into(), description: None }
}

// =============================================================================
// LlmError::error_code
// =============================================================================

#[test]
fn error_code_missing_api_key() {
    let err = LlmError::MissingApiKey { var: "ANTHROPIC_API_KEY".into() };
    assert_eq!(err.error_code(), "E_MISSING_API_KEY");
}

#[test]
fn error_code_api_response() {
    let err = LlmError::ApiResponse { status: 500, body: "oops".into() };
    assert_eq!(err.error_code(), "E_API_RESPONSE");
}

#[test]
fn error_code_empty_response() {
    assert_eq!(LlmError::EmptyResponse.error_code(), "E_EMPTY_RESPONSE");
}

// =============================================================================
// LlmError::retryable
// =============================================================================

#[test]
fn retryable_api_request() {
    assert!(LlmError::ApiRequest("conn refused".into()).retryable());
}

#[test]
fn retryable_api_response_429_and_5xx() {
    assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
}

#[test]
fn not_retryable_client_errors() {
    assert!(!LlmError::ApiResponse { status: 400, body: String::new() }.retryable());
    assert!(!LlmError::ApiParse("bad".into()).retryable());
    assert!(!LlmError::EmptyResponse.retryable());
}

// =============================================================================
// dedup_sources
// =============================================================================

#[test]
fn dedup_sources_keeps_first_occurrence_in_order() {
    let out = dedup_sources(vec![
        source("https://a.test", "A"),
        source("https://b.test", "B"),
        source("https://a.test", "A again"),
        source("https://c.test", "C"),
    ]);
    let titles: Vec<&str> = out.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["A", "B", "C"]);
}

#[test]
fn web_source_description_is_optional_on_the_wire() {
    let parsed: WebSource = serde_json::from_str(r#"{"title":"BEA","url":"https://bea.gov"}"#).unwrap();
    assert_eq!(parsed, source("https://bea.gov", "BEA"));
    let json = serde_json::to_value(&parsed).unwrap();
    assert!(json.get("description").is_none());
}
