use super::*;
use crate::llm::types::WebSource;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

// =========================================================================
// MockLlm
// =========================================================================

struct MockLlm {
    responses: Mutex<Vec<Result<Completion, LlmError>>>,
    calls: AtomicUsize,
    web_search: Mutex<Vec<bool>>,
}

impl MockLlm {
    fn new(responses: Vec<Result<Completion, LlmError>>) -> Arc<Self> {
        Arc::new(Self { responses: Mutex::new(responses), calls: AtomicUsize::new(0), web_search: Mutex::new(vec![]) })
    }
}

#[async_trait]
impl LlmChat for MockLlm {
    fn model(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: &ChatRequest<'_>) -> Result<Completion, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.web_search.lock().unwrap().push(request.web_search);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() { Err(LlmError::EmptyResponse) } else { responses.remove(0) }
    }
}

/// Replays a raw Anthropic response body through the real parser.
struct TranscriptLlm {
    body: String,
}

#[async_trait]
impl LlmChat for TranscriptLlm {
    fn model(&self) -> &str {
        "transcript"
    }

    async fn chat(&self, _request: &ChatRequest<'_>) -> Result<Completion, LlmError> {
        crate::llm::anthropic::parse_response(&self.body)
    }
}

fn completion(text: &str, sources: Vec<WebSource>) -> Completion {
    Completion { text: text.into(), sources, model: "mock".into(), input_tokens: 1, output_tokens: 1 }
}

fn adapter(client: Option<Arc<dyn LlmChat>>) -> ProviderAdapter {
    ProviderAdapter::new("Claude", "ANTHROPIC_API_KEY", client, 1024)
}

fn valid_reply(message: &str) -> String {
    serde_json::json!({ "configuration": ChartConfiguration::sample(), "message": message }).to_string()
}

// =========================================================================
// modify_chart
// =========================================================================

#[tokio::test]
async fn unconfigured_adapter_fails_without_calling_client() {
    let resp = adapter(None)
        .modify_chart(&ChartConfiguration::sample(), "hi", false)
        .await;
    assert_eq!(
        resp,
        ChatResponse::failure(
            FailureKind::NotConfigured,
            "Claude API key is not configured. Please add ANTHROPIC_API_KEY to your .env file."
        )
    );
}

#[tokio::test]
async fn client_error_maps_to_request_failed() {
    let mock = MockLlm::new(vec![Err(LlmError::ApiResponse { status: 529, body: "overloaded".into() })]);
    let resp = adapter(Some(mock.clone()))
        .modify_chart(&ChartConfiguration::sample(), "hi", false)
        .await;
    assert_eq!(
        resp,
        ChatResponse::failure(FailureKind::RequestFailed, "Claude API request failed. Trying fallback provider...")
    );
    assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn successful_completion_is_parsed() {
    let mock = MockLlm::new(vec![Ok(completion(&valid_reply("Done"), vec![]))]);
    let resp = adapter(Some(mock.clone()))
        .modify_chart(&ChartConfiguration::sample(), "hi", false)
        .await;
    assert!(resp.is_success());
    assert_eq!(resp.message(), "Done");
    assert_eq!(*mock.web_search.lock().unwrap(), vec![false]);
}

#[tokio::test]
async fn garbage_completion_is_malformed() {
    let mock = MockLlm::new(vec![Ok(completion("I cannot do that.", vec![]))]);
    let resp = adapter(Some(mock))
        .modify_chart(&ChartConfiguration::sample(), "hi", false)
        .await;
    assert!(matches!(resp, ChatResponse::Failure { kind: FailureKind::Malformed, .. }));
}

#[tokio::test]
async fn web_search_passes_flag_and_extracted_sources() {
    let extracted = vec![WebSource { title: "BEA".into(), url: "https://bea.gov".into(), description: None }];
    let mock = MockLlm::new(vec![Ok(completion(&valid_reply("Found GDP"), extracted.clone()))]);
    let resp = adapter(Some(mock.clone()))
        .modify_chart(&ChartConfiguration::sample(), "find US GDP", true)
        .await;
    let ChatResponse::Success { sources, .. } = resp else { panic!("expected success") };
    assert_eq!(sources, extracted);
    assert_eq!(*mock.web_search.lock().unwrap(), vec![true]);
}

#[tokio::test]
async fn parses_last_text_block_of_search_transcript() {
    let body = serde_json::json!({
        "content": [
            { "type": "text", "text": "I will search" },
            { "type": "server_tool_use", "id": "s1", "name": "web_search", "input": { "query": "gdp" } },
            { "type": "web_search_tool_result", "tool_use_id": "s1", "content": [
                { "type": "web_search_result", "url": "https://bea.gov", "title": "BEA" }
            ]},
            { "type": "text", "text": valid_reply("Here is GDP") }
        ],
        "model": "claude-haiku-4-5",
        "usage": { "input_tokens": 1, "output_tokens": 1 }
    })
    .to_string();
    let resp = adapter(Some(Arc::new(TranscriptLlm { body })))
        .modify_chart(&ChartConfiguration::sample(), "gdp", true)
        .await;
    let ChatResponse::Success { message, sources, .. } = resp else { panic!("expected success") };
    assert_eq!(message, "Here is GDP");
    assert_eq!(sources[0].url, "https://bea.gov");
}

// =========================================================================
// slides
// =========================================================================

#[tokio::test]
async fn slide_draft_parses_completion_without_web_search() {
    let text = r#"{"actionTitle":"Act","insights":["a","b","c"],"units":"$"}"#;
    let mock = MockLlm::new(vec![Ok(completion(text, vec![]))]);
    let draft = adapter(Some(mock.clone()))
        .slide_draft(&ChartConfiguration::sample().data)
        .await
        .unwrap();
    assert_eq!(draft.action_title, "Act");
    assert_eq!(*mock.web_search.lock().unwrap(), vec![false]);
}

#[tokio::test]
async fn slide_calls_return_none_on_failure_or_missing_key() {
    let data = ChartConfiguration::sample().data;
    assert!(adapter(None).infer_units(&data).await.is_none());
    let mock = MockLlm::new(vec![Err(LlmError::ApiRequest("reset".into()))]);
    assert!(adapter(Some(mock)).action_title(&[], &data).await.is_none());
}

#[tokio::test]
async fn infer_units_reads_units_field() {
    let mock = MockLlm::new(vec![Ok(completion(r#"{"units":"kg"}"#, vec![]))]);
    let units = adapter(Some(mock))
        .infer_units(&ChartConfiguration::sample().data)
        .await;
    assert_eq!(units.as_deref(), Some("kg"));
}

// =========================================================================
// construction
// =========================================================================

#[test]
fn from_config_without_keys_is_unconfigured() {
    let provider = |model: &str| crate::llm::config::ProviderConfig {
        api_key: None,
        model: model.into(),
        base_url: "http://localhost".into(),
    };
    let config = AiConfig {
        anthropic: provider("claude-haiku-4-5"),
        gemini: provider("gemini-2.5-flash"),
        timeouts: crate::llm::config::LlmTimeouts { request_secs: 1, connect_secs: 1 },
        max_tokens: 10,
        web_search_max_uses: 1,
        request_deadline_secs: 1,
    };
    assert!(!ProviderAdapter::claude(&config).is_configured());
    assert!(!ProviderAdapter::gemini(&config).is_configured());
    assert_eq!(ProviderAdapter::gemini(&config).name(), "Gemini");
}
