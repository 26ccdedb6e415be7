//! Response parser: turns raw completion text into typed results.
//!
//! DESIGN
//! ======
//! Model output is untrusted. Each parser locates the JSON object inside the
//! text (models prepend prose and wrap answers in Markdown fences), checks
//! its shape, deserializes it into the typed model and validates
//! invariants. Anything short of a fully valid result becomes a
//! [`ChatResponse::Failure`] or `None`; these functions never return `Err`
//! and never panic, so a bad answer cannot reach the store.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::chart::{ChartConfiguration, ChartError, ChartStyling};
use crate::llm::types::WebSource;
use crate::services::assistant::{ChatResponse, FailureKind, MALFORMED_RESPONSE_MESSAGE};
use crate::services::slides::{ActionTitle, InsightKind, SlideDraft, SlideInsight};

/// Extracted sources used when the model lists none of its own.
const MAX_EXTRACTED_SOURCES: usize = 3;
const MIN_SLIDE_INSIGHTS: usize = 3;
const MAX_SLIDE_INSIGHTS: usize = 5;
const DEFAULT_UNITS: &str = "units";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
enum ResponseError {
    #[error("no JSON object in response")]
    NoJson,
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing or empty field: {0}")]
    MissingField(&'static str),
    #[error("configuration rejected: {0}")]
    Chart(#[from] ChartError),
}

// =============================================================================
// JSON EXTRACTION
// =============================================================================

/// Find the first JSON value in `raw`, skipping anything before the first
/// `{` and any Markdown fence markers. Trailing text after the value is
/// ignored.
fn extract_json(raw: &str) -> Result<Value, ResponseError> {
    let start = raw.find('{').ok_or(ResponseError::NoJson)?;
    let cleaned = raw[start..].replace("```json", "").replace("```", "");
    let mut values = serde_json::Deserializer::from_str(cleaned.trim()).into_iter::<Value>();
    match values.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => Err(e.into()),
        None => Err(ResponseError::NoJson),
    }
}

// =============================================================================
// CHART MODIFICATION
// =============================================================================

struct ChartReply {
    configuration: ChartConfiguration,
    message: String,
    sources: Vec<WebSource>,
}

/// Interpret a chart-modification completion.
///
/// With web search on, sources come from the reply's own non-empty `sources`
/// array when present, otherwise from the first three `extracted_sources`
/// the provider reported. With web search off, sources are always empty.
///
/// Styling keys the reply leaves out keep their values from `base`.
#[must_use]
pub fn parse_ai_response(
    base: &ChartConfiguration,
    raw: &str,
    use_web_search: bool,
    extracted_sources: &[WebSource],
) -> ChatResponse {
    let reply = match parse_chart_reply(base, raw) {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, raw_len = raw.len(), "parse: rejected chart response");
            return ChatResponse::failure(FailureKind::Malformed, MALFORMED_RESPONSE_MESSAGE);
        }
    };

    let sources = if !use_web_search {
        Vec::new()
    } else if !reply.sources.is_empty() {
        reply.sources
    } else {
        if extracted_sources.is_empty() {
            debug!("parse: web search enabled but no sources found");
        }
        extracted_sources
            .iter()
            .take(MAX_EXTRACTED_SOURCES)
            .cloned()
            .collect()
    };

    ChatResponse::Success { configuration: reply.configuration, message: reply.message, sources }
}

fn parse_chart_reply(base: &ChartConfiguration, raw: &str) -> Result<ChartReply, ResponseError> {
    let mut value = extract_json(raw)?;

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty())
        .ok_or(ResponseError::MissingField("message"))?
        .to_string();

    let mut configuration = value
        .get_mut("configuration")
        .filter(|c| c.is_object())
        .map(Value::take)
        .ok_or(ResponseError::MissingField("configuration"))?;
    for field in ["data", "styling"] {
        if configuration.get(field).is_none_or(Value::is_null) {
            return Err(ResponseError::MissingField(field));
        }
    }
    merge_styling(&mut configuration, &base.styling)?;
    let configuration: ChartConfiguration = serde_json::from_value(configuration)?;
    configuration.validate()?;

    let sources = value
        .get("sources")
        .and_then(Value::as_array)
        .map(|items| reply_sources(items))
        .unwrap_or_default();

    Ok(ChartReply { configuration, message, sources })
}

/// Lay the reply's `styling` keys over the current styling.
fn merge_styling(configuration: &mut Value, base: &ChartStyling) -> Result<(), ResponseError> {
    let Some(Value::Object(reply)) = configuration.get_mut("styling").map(Value::take) else {
        return Err(ResponseError::MissingField("styling"));
    };
    let Value::Object(mut merged) = serde_json::to_value(base)? else {
        return Err(ResponseError::MissingField("styling"));
    };
    merged.extend(reply);
    configuration["styling"] = Value::Object(merged);
    Ok(())
}

/// Keep the well-formed entries of a reply's `sources` array.
fn reply_sources(items: &[Value]) -> Vec<WebSource> {
    items
        .iter()
        .filter_map(|item| WebSource::deserialize(item).ok())
        .filter(|source| !source.url.trim().is_empty())
        .collect()
}

// =============================================================================
// SLIDES
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDraft {
    #[serde(default)]
    action_title: String,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    insights: Vec<RawInsight>,
    #[serde(default)]
    units: Option<String>,
}

/// Models sometimes return bare strings instead of `{ "text": ... }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawInsight {
    Object { text: String },
    Text(String),
}

impl RawInsight {
    fn into_text(self) -> String {
        match self {
            Self::Object { text } | Self::Text(text) => text,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActionTitle {
    #[serde(default)]
    action_title: String,
    #[serde(default)]
    subtitle: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Interpret a slide-generation completion. Requires an action title and at
/// least three insights; extra insights beyond five are dropped.
#[must_use]
pub fn parse_slide_response(raw: &str) -> Option<SlideDraft> {
    let draft: RawDraft = match extract_json(raw).and_then(|v| serde_json::from_value(v).map_err(ResponseError::from)) {
        Ok(draft) => draft,
        Err(e) => {
            warn!(error = %e, raw_len = raw.len(), "parse: rejected slide response");
            return None;
        }
    };

    let action_title = non_blank(Some(draft.action_title))?;
    let insights: Vec<SlideInsight> = draft
        .insights
        .into_iter()
        .map(RawInsight::into_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .take(MAX_SLIDE_INSIGHTS)
        .enumerate()
        .map(|(idx, text)| SlideInsight {
            text,
            kind: if idx == 0 { InsightKind::Main } else { InsightKind::Supporting },
        })
        .collect();
    if insights.len() < MIN_SLIDE_INSIGHTS {
        warn!(count = insights.len(), "parse: slide response has too few insights");
        return None;
    }

    Some(SlideDraft {
        action_title,
        subtitle: non_blank(draft.subtitle),
        insights,
        units: non_blank(draft.units).unwrap_or_else(|| DEFAULT_UNITS.to_string()),
    })
}

/// Interpret an action-title completion. `None` without a non-empty title.
#[must_use]
pub fn parse_action_title_response(raw: &str) -> Option<ActionTitle> {
    let value = extract_json(raw).ok()?;
    let parsed: RawActionTitle = serde_json::from_value(value).ok()?;
    Some(ActionTitle {
        action_title: non_blank(Some(parsed.action_title))?,
        subtitle: non_blank(parsed.subtitle).unwrap_or_default(),
    })
}

/// Interpret a units-inference completion. `None` without a non-empty
/// `units` string.
#[must_use]
pub fn parse_units_response(raw: &str) -> Option<String> {
    let value = extract_json(raw).ok()?;
    non_blank(value.get("units").and_then(Value::as_str).map(String::from))
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
