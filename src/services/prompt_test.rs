use super::*;
use crate::services::slides::InsightKind;

#[test]
fn chart_prompt_embeds_config_and_message() {
    let config = ChartConfiguration::sample();
    let prompt = build_chart_modification_prompt(&config, "make it a line chart", false);
    assert!(prompt.contains("User Request: \"make it a line chart\""));
    assert!(prompt.contains(&serde_json::to_string_pretty(&config).unwrap()));
    assert!(prompt.contains("\"xAxisKey\": \"quarter\""));
    assert!(prompt.contains("TWO keys"));
    assert!(!prompt.contains("\"sources\""));
    assert!(!prompt.contains("web_search"));
}

#[test]
fn chart_prompt_with_web_search_asks_for_sources() {
    let prompt = build_chart_modification_prompt(&ChartConfiguration::sample(), "US GDP 2020-2023", true);
    assert!(prompt.contains("enabled web search"));
    assert!(prompt.contains("THREE keys"));
    assert!(prompt.contains("\"sources\""));
    assert!(prompt.contains("web_search tool"));
    assert!(prompt.contains("typically 1-3"));
}

#[test]
fn chart_prompt_states_domain_rules() {
    let prompt = build_chart_modification_prompt(&ChartConfiguration::sample(), "x", false);
    assert!(prompt.contains("same xAxisKey"));
    assert!(prompt.contains("Only modify what the user asked for"));
    assert!(prompt.contains("seriesNames consistency"));
    assert!(prompt.contains("'right'"));
    assert!(prompt.contains("START with the opening brace"));
}

#[test]
fn slide_prompt_embeds_data() {
    let data = ChartConfiguration::sample().data;
    let prompt = build_slide_generation_prompt(&data);
    assert!(prompt.contains("\"seriesNames\""));
    assert!(prompt.contains("Product A"));
    assert!(prompt.contains("\"actionTitle\""));
    assert!(prompt.contains("3-5"));
}

#[test]
fn action_title_prompt_numbers_insights() {
    let insights = vec![
        SlideInsight { text: "A grew 45%".into(), kind: InsightKind::Main },
        SlideInsight { text: "B is volatile".into(), kind: InsightKind::Supporting },
    ];
    let prompt = build_action_title_prompt(&insights, &ChartConfiguration::sample().data);
    assert!(prompt.contains("1. A grew 45%\n2. B is volatile\n"));
    assert!(prompt.contains("\"actionTitle\""));
}

#[test]
fn units_prompt_requests_units_key() {
    let prompt = build_units_inference_prompt(&ChartConfiguration::sample().data);
    assert!(prompt.contains("{ \"units\": \"$\" }"));
    assert!(prompt.contains("quarter"));
}
