//! Slide-content generator: consulting-style slide copy for the chart.
//!
//! DESIGN
//! ======
//! Slide copy comes from the slide assistant chain (Gemini first, Claude
//! second). When neither answers usefully the service falls back to a
//! deterministic local draft built from simple statistics over the visible
//! series, so slide generation never fails. Only visible series are shown
//! to the model or counted locally.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chart::{ChartConfiguration, ChartData, DataPoint};
use crate::services::assistant::SlideAssistant;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    /// The headline finding.
    Main,
    #[default]
    Supporting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideInsight {
    pub text: String,
    #[serde(rename = "type", default)]
    pub kind: InsightKind,
}

/// Slide copy as produced by an assistant or the local fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideDraft {
    pub action_title: String,
    pub subtitle: Option<String>,
    /// Between three and five entries.
    pub insights: Vec<SlideInsight>,
    pub units: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTitle {
    pub action_title: String,
    pub subtitle: String,
}

/// Everything the slide template needs besides the chart itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideContent {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub chart_title: String,
    pub chart_units: String,
    pub insights: Vec<SlideInsight>,
}

// =============================================================================
// SERVICE
// =============================================================================

pub struct SlideService {
    assistant: Arc<dyn SlideAssistant>,
}

impl SlideService {
    #[must_use]
    pub fn new(assistant: Arc<dyn SlideAssistant>) -> Self {
        Self { assistant }
    }

    /// Build slide content for the chart's visible series.
    pub async fn generate_slide_content(&self, config: &ChartConfiguration) -> SlideContent {
        let data = visible_data(config);

        let draft = if let Some(draft) = self.assistant.slide_draft(&data).await {
            info!(insights = draft.insights.len(), "slides: AI draft accepted");
            draft
        } else {
            warn!("slides: no AI draft, using local statistics");
            local_draft(&data)
        };

        let chart_title = if config.styling.title.trim().is_empty() {
            format!("{} by {}", data.series_names.join(", "), data.x_axis_key)
        } else {
            config.styling.title.clone()
        };

        SlideContent {
            title: draft.action_title,
            subtitle: draft.subtitle,
            chart_title,
            chart_units: draft.units,
            insights: draft.insights,
        }
    }

    /// Action title concluding `insights`, falling back to the objective
    /// stated in the data description.
    pub async fn generate_action_title(&self, insights: &[SlideInsight], data: &ChartData) -> ActionTitle {
        if let Some(title) = self.assistant.action_title(insights, data).await {
            return title;
        }
        warn!("slides: no AI action title, using local fallback");
        local_action_title(data)
    }

    /// Units of the chart values, falling back to local inference.
    pub async fn infer_units(&self, data: &ChartData) -> String {
        if let Some(units) = self.assistant.infer_units(data).await {
            return units;
        }
        warn!("slides: no AI units, using local inference");
        infer_units_locally(data)
    }
}

/// The chart data restricted to visible series. Hidden series fields are
/// removed from every data point.
fn visible_data(config: &ChartConfiguration) -> ChartData {
    let hidden = &config.styling.hidden_series;
    let data_points = config
        .data
        .data_points
        .iter()
        .map(|point| {
            point
                .iter()
                .filter(|(key, _)| !hidden.contains(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<DataPoint>()
        })
        .collect();

    ChartData {
        data_points,
        x_axis_key: config.data.x_axis_key.clone(),
        series_names: config.visible_series(),
        description: config.data.description.clone(),
    }
}

// =============================================================================
// LOCAL FALLBACK
// =============================================================================

fn objective_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)(?:objective|goal|aim):\s*(.+?)(?:\.|$)").ok())
        .as_ref()
}

/// The user's objective from a description like "Goal: grow APAC revenue."
fn user_objective(description: Option<&str>) -> Option<String> {
    let captures = objective_pattern()?.captures(description?)?;
    let objective = captures.get(1)?.as_str().trim();
    (!objective.is_empty()).then(|| objective.to_string())
}

fn local_action_title(data: &ChartData) -> ActionTitle {
    let action_title = match user_objective(data.description.as_deref()) {
        Some(objective) => format!(
            "Optimize {} to {}",
            data.series_names.first().map_or("performance", String::as_str),
            objective.to_lowercase()
        ),
        None => format!("Strategic recommendations based on {} analysis", data.x_axis_key),
    };
    ActionTitle { action_title, subtitle: format!("Insights from {} key metrics", data.series_names.len()) }
}

fn local_draft(data: &ChartData) -> SlideDraft {
    let title = local_action_title(data);
    let units = infer_units_locally(data);
    SlideDraft {
        action_title: title.action_title,
        subtitle: Some(title.subtitle),
        insights: local_insights(data, &units),
        units,
    }
}

/// Units guessed from series names, value magnitude, then description.
#[must_use]
pub fn infer_units_locally(data: &ChartData) -> String {
    let series_text = data.series_names.join(" ").to_lowercase();

    let units = if contains_any(&series_text, &["sales", "revenue", "price"]) {
        "$"
    } else if contains_any(&series_text, &["percent", "%"]) {
        "%"
    } else if contains_any(&series_text, &["count", "number"]) {
        "units"
    } else if contains_any(&series_text, &["weight"]) {
        "kg"
    } else if contains_any(&series_text, &["temperature"]) {
        "°C"
    } else if max_value(&data.data_points).is_some_and(|max| max > 1000.0) {
        "$"
    } else if data
        .description
        .as_deref()
        .is_some_and(|d| contains_any(&d.to_lowercase(), &["sales", "revenue"]))
    {
        "$"
    } else {
        "units"
    };
    units.to_string()
}

fn contains_any(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}

fn max_value(points: &[DataPoint]) -> Option<f64> {
    points
        .iter()
        .flat_map(|point| point.values().filter_map(crate::chart::DataValue::as_f64))
        .reduce(f64::max)
}

struct SeriesStats<'a> {
    name: &'a str,
    total: f64,
    max: f64,
    max_category: String,
    above_average: usize,
    count: usize,
}

fn series_stats<'a>(data: &'a ChartData, name: &'a str) -> Option<SeriesStats<'a>> {
    let pairs: Vec<(String, f64)> = data
        .data_points
        .iter()
        .filter_map(|point| {
            let value = point.get(name)?.as_f64()?;
            let category = point
                .get(&data.x_axis_key)
                .map(ToString::to_string)
                .unwrap_or_default();
            Some((category, value))
        })
        .collect();
    if pairs.is_empty() {
        return None;
    }

    let total: f64 = pairs.iter().map(|(_, v)| v).sum();
    #[allow(clippy::cast_precision_loss)]
    let average = total / pairs.len() as f64;
    let (max_category, max) = pairs
        .iter()
        .fold(None::<&(String, f64)>, |best, pair| match best {
            Some(b) if b.1 >= pair.1 => Some(b),
            _ => Some(pair),
        })
        .map(|(c, v)| (c.clone(), *v))
        .unwrap_or_default();

    Some(SeriesStats {
        name,
        total,
        max,
        max_category,
        above_average: pairs.iter().filter(|(_, v)| *v > average).count(),
        count: pairs.len(),
    })
}

/// Five statistical observations over the visible series, or four generic
/// lines when there is no numeric data.
fn local_insights(data: &ChartData, units: &str) -> Vec<SlideInsight> {
    let stats: Vec<SeriesStats<'_>> = data
        .series_names
        .iter()
        .filter_map(|name| series_stats(data, name))
        .collect();
    let Some(first) = stats.first() else {
        return generic_insights();
    };

    let grand_total: f64 = stats.iter().map(|s| s.total).sum();
    let count: usize = stats.iter().map(|s| s.count).sum();
    let above: usize = stats.iter().map(|s| s.above_average).sum();
    let best = stats
        .iter()
        .fold(first, |best, s| if s.total > best.total { s } else { best });
    let peak = stats
        .iter()
        .fold(first, |peak, s| if s.max > peak.max { s } else { peak });
    #[allow(clippy::cast_precision_loss)]
    let average = grand_total / count as f64;

    let texts = [
        format!("Total combined value: {} {units}", format_number(grand_total)),
        format!("{} leads with {} {units}", best.name, format_number(best.total)),
        format!("Peak: {} at {} ({} {units})", peak.name, peak.max_category, format_number(peak.max)),
        format!("Average performance: {} {units}", format_number(average)),
        format!("{above}/{count} data points exceed average"),
    ];
    texts
        .into_iter()
        .enumerate()
        .map(|(idx, text)| SlideInsight {
            text,
            kind: if idx == 0 { InsightKind::Main } else { InsightKind::Supporting },
        })
        .collect()
}

fn generic_insights() -> Vec<SlideInsight> {
    [
        ("Chart displays key business metrics", InsightKind::Main),
        ("Data organized by relevant categories", InsightKind::Supporting),
        ("Trends visible across time periods", InsightKind::Supporting),
        ("Performance metrics clearly visualized", InsightKind::Supporting),
    ]
    .into_iter()
    .map(|(text, kind)| SlideInsight { text: text.into(), kind })
    .collect()
}

/// Round to a whole number and group thousands with commas.
fn format_number(value: f64) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        grouped.push('-');
    }
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
#[path = "slides_test.rs"]
mod tests;
