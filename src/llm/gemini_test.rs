use super::*;

fn make_response(parts: serde_json::Value, grounding: Option<serde_json::Value>) -> String {
    let mut candidate = serde_json::json!({
        "content": { "role": "model", "parts": parts },
        "finishReason": "STOP"
    });
    if let Some(meta) = grounding {
        candidate["groundingMetadata"] = meta;
    }
    serde_json::json!({
        "candidates": [candidate],
        "usageMetadata": { "promptTokenCount": 80, "candidatesTokenCount": 40, "totalTokenCount": 120 },
        "modelVersion": "gemini-2.5-flash-001"
    })
    .to_string()
}

// =============================================================================
// parse_response
// =============================================================================

#[test]
fn parse_text_response() {
    let json = make_response(serde_json::json!([{ "text": "hello" }]), None);
    let resp = parse_response(&json, "gemini-2.5-flash").unwrap();
    assert_eq!(resp.text, "hello");
    assert!(resp.sources.is_empty());
    assert_eq!(resp.model, "gemini-2.5-flash-001");
    assert_eq!(resp.input_tokens, 80);
    assert_eq!(resp.output_tokens, 40);
}

#[test]
fn parse_concatenates_text_parts_and_skips_thoughts() {
    let json = make_response(
        serde_json::json!([
            { "text": "thinking about it", "thought": true },
            { "text": "{\"configuration\":" },
            { "text": "{}}" }
        ]),
        None,
    );
    let resp = parse_response(&json, "m").unwrap();
    assert_eq!(resp.text, "{\"configuration\":{}}");
}

#[test]
fn parse_grounding_chunks_become_sources() {
    let json = make_response(
        serde_json::json!([{ "text": "answer" }]),
        Some(serde_json::json!({
            "webSearchQueries": ["us gdp 2023"],
            "groundingChunks": [
                { "web": { "uri": "https://bea.gov/gdp", "title": "bea.gov" } },
                { "web": { "uri": "https://worldbank.org" } },
                { "web": { "uri": "https://bea.gov/gdp", "title": "dup" } },
                { "retrievedContext": {} }
            ]
        })),
    );
    let resp = parse_response(&json, "m").unwrap();
    assert_eq!(
        resp.sources,
        vec![
            WebSource {
                title: "bea.gov".into(),
                url: "https://bea.gov/gdp".into(),
                description: Some("https://bea.gov/gdp".into())
            },
            WebSource {
                title: "Web Source".into(),
                url: "https://worldbank.org".into(),
                description: Some("https://worldbank.org".into())
            },
        ]
    );
}

#[test]
fn parse_missing_model_version_uses_fallback() {
    let json = serde_json::json!({ "candidates": [{ "content": { "parts": [{ "text": "x" }] } }] }).to_string();
    let resp = parse_response(&json, "gemini-2.5-flash").unwrap();
    assert_eq!(resp.model, "gemini-2.5-flash");
    assert_eq!(resp.input_tokens, 0);
}

#[test]
fn parse_without_candidates_is_parse_error() {
    let json = serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
    assert!(matches!(parse_response(&json, "m"), Err(LlmError::ApiParse(_))));
}

#[test]
fn parse_without_text_is_empty_response() {
    let json = serde_json::json!({ "candidates": [{ "finishReason": "MAX_TOKENS" }] }).to_string();
    assert!(matches!(parse_response(&json, "m"), Err(LlmError::EmptyResponse)));
}

#[test]
fn parse_invalid_json() {
    assert!(matches!(parse_response("<html>", "m"), Err(LlmError::ApiParse(_))));
}

// =============================================================================
// request body
// =============================================================================

#[test]
fn request_body_shape() {
    let body = ApiRequest {
        contents: vec![Content { role: "user", parts: vec![Part { text: "prompt" }] }],
        tools: vec![GeminiTool { google_search: GoogleSearch {} }],
        generation_config: GenerationConfig { max_output_tokens: 4096 },
    };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
    assert_eq!(json["tools"][0]["google_search"], serde_json::json!({}));
    assert_eq!(json["generationConfig"]["maxOutputTokens"], 4096);
}

#[test]
fn request_body_omits_tools_without_web_search() {
    let body = ApiRequest {
        contents: vec![],
        tools: Vec::new(),
        generation_config: GenerationConfig { max_output_tokens: 1 },
    };
    let json = serde_json::to_value(&body).unwrap();
    assert!(json.get("tools").is_none());
}

#[test]
fn new_builds_model_url() {
    let config = ProviderConfig {
        api_key: Some("k".into()),
        model: "gemini-2.5-flash".into(),
        base_url: "https://generativelanguage.googleapis.com".into(),
    };
    let client = GeminiClient::new(&config, LlmTimeouts { request_secs: 5, connect_secs: 1 }).unwrap();
    assert_eq!(
        client.url,
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
    );
}
