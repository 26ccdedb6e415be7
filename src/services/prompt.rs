//! Prompt builder: pure functions producing provider-agnostic prompts.
//!
//! Every prompt embeds the relevant chart state as pretty JSON and asks for a
//! raw JSON object back. The same text goes to Claude and Gemini.

use std::fmt::Write;

use crate::chart::{ChartConfiguration, ChartData};
use crate::services::slides::SlideInsight;

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".into())
}

// =============================================================================
// CHART MODIFICATION
// =============================================================================

/// Prompt asking the model to rewrite `config` according to `user_message`.
#[must_use]
pub fn build_chart_modification_prompt(
    config: &ChartConfiguration,
    user_message: &str,
    use_web_search: bool,
) -> String {
    let mut out = String::new();

    out.push_str("You are a chart configuration expert. The user wants to modify their chart");
    if use_web_search {
        out.push_str(" and has enabled web search to find data online");
    }
    out.push_str(".\n\n");

    let _ = writeln!(out, "Current Chart Configuration:\n{}\n", pretty(config));
    let _ = writeln!(out, "User Request: \"{user_message}\"\n");

    out.push_str("Your task is to:\n1. Analyze the user's request\n");
    if use_web_search {
        out.push_str(
            "2. IMPORTANT: Use the web_search tool to find the requested data online\n\
             3. Extract the specific data values from the search results\n\
             4. Update the chart configuration with the found data\n\
             5. Return ONLY a valid JSON object with THREE keys:\n",
        );
        out.push_str(
            "   - \"configuration\": The updated ChartConfiguration object with the data you found from web search\n\
             \x20  - \"message\": A friendly message (3-5 sentences) that MUST include what data you searched for, \
             the actual data values you found (list them out), and which sources you used\n\
             \x20  - \"sources\": REQUIRED array of ONLY the sources you actually used to extract data, \
             each with \"title\", \"url\" and \"description\" (what specific data came from it)\n",
        );
    } else {
        out.push_str(
            "2. Modify the chart configuration accordingly\n\
             3. Return ONLY a valid JSON object with TWO keys:\n\
             \x20  - \"configuration\": The updated ChartConfiguration object with the modified data\n\
             \x20  - \"message\": A friendly message that explains what you changed (2-3 sentences)\n",
        );
    }

    out.push_str(
        "\nRules:\n\
         - Keep data structure consistent (same xAxisKey format)\n\
         - Only modify what the user asked for\n\
         - Chart types: 'bar', 'line', or 'combined'\n\
         - Series types: 'bar' or 'line'\n\
         - If user asks to change data, modify dataPoints array\n\
         - If user asks about styling (colors, type, labels), modify styling object\n\
         - Preserve seriesNames consistency with dataPoints keys: every series name must be a key of every data point\n\
         - Y-Axis Assignment (seriesYAxis): use 'right' only for series whose units cannot be compared on the same \
         scale as the others (absolute values vs percentages, large magnitude differences, different units). \
         Default to 'left'. When using the right Y-axis, say why in your message\n",
    );
    if use_web_search {
        out.push_str(
            "- CRITICAL: You MUST use web_search to find data, not make it up\n\
             - CRITICAL: Your message MUST describe the actual data values you found\n\
             - CRITICAL: The \"sources\" array must include ONLY the sources you actually used (typically 1-3)\n",
        );
    }
    out.push_str(
        "- Return valid JSON only, no markdown, no code blocks, no explanatory text before or after\n\
         - Your response must START with the opening brace { of the JSON object\n\n",
    );

    if use_web_search {
        out.push_str(WEB_SEARCH_EXAMPLE);
    } else {
        out.push_str(PLAIN_EXAMPLE);
    }
    out
}

const PLAIN_EXAMPLE: &str = r#"Example response with dual Y-axes (when series have different units):
{
  "configuration": {
    "data": {
      "dataPoints": [
        { "quarter": "Q1", "Revenue": 1200, "Profit Margin": 15.5 },
        { "quarter": "Q2", "Revenue": 1500, "Profit Margin": 18.2 }
      ],
      "xAxisKey": "quarter",
      "seriesNames": ["Revenue", "Profit Margin"]
    },
    "styling": {
      ...existing styling...,
      "seriesYAxis": { "Revenue": "left", "Profit Margin": "right" }
    }
  },
  "message": "I've set up dual Y-axes for your chart. Revenue (in dollars) uses the left axis, while Profit Margin (in percentages) uses the right axis."
}"#;

const WEB_SEARCH_EXAMPLE: &str = r#"Example response with web search:
{
  "configuration": {
    "data": {
      "dataPoints": [
        { "year": "2020", "GDP": 21060, "Growth Rate": 2.3 },
        { "year": "2021", "GDP": 23315, "Growth Rate": 5.8 },
        { "year": "2022", "GDP": 25464, "Growth Rate": 2.1 }
      ],
      "xAxisKey": "year",
      "seriesNames": ["GDP", "Growth Rate"]
    },
    "styling": {
      ...existing styling...,
      "seriesYAxis": { "GDP": "left", "Growth Rate": "right" }
    }
  },
  "message": "I searched for US GDP data and growth rates from 2020-2022. GDP was $21.06T, $23.32T and $25.46T; growth was 2.3%, 5.8% and 2.1%. GDP uses the left axis and growth rate the right axis because trillions of dollars and percentages cannot share a scale.",
  "sources": [
    {
      "title": "U.S. GDP | U.S. Bureau of Economic Analysis (BEA)",
      "url": "https://www.bea.gov/data/gdp/gross-domestic-product",
      "description": "Official GDP data and growth rates for 2020-2022"
    }
  ]
}"#;

// =============================================================================
// SLIDES
// =============================================================================

/// Prompt for a full slide draft: action title, subtitle, 3-5 insights, units.
#[must_use]
pub fn build_slide_generation_prompt(data: &ChartData) -> String {
    format!(
        r#"You are a McKinsey-style business consultant analyzing data for a presentation slide.

Chart Data:
{data}

Generate 3-5 bespoke insights (prefer 3) following the Minto Pyramid Principle. They will support an action-oriented title on a consulting slide.

Guidelines:
- Analyze actual data patterns, trends, growth rates, and comparisons
- Insights must be SPECIFIC to this data, not generic templates
- Each insight is 1-2 sentences maximum
- Focus on the "so what": actionable observations
- Consider the user's objective if the description states one

Also generate an action-oriented title (the recommendation), a subtitle (context about the data), and the units of the values ($, %, units, etc.).

Return ONLY a valid JSON object with this structure:
{{
  "actionTitle": "Verb-based recommendation based on data findings",
  "subtitle": "Brief context about the analysis",
  "insights": [
    {{ "text": "First key insight from the data" }},
    {{ "text": "Second supporting insight" }},
    {{ "text": "Third insight" }}
  ],
  "units": "$"
}}"#,
        data = pretty(data)
    )
}

/// Prompt for an action title that concludes the given insights.
#[must_use]
pub fn build_action_title_prompt(insights: &[SlideInsight], data: &ChartData) -> String {
    let mut numbered = String::new();
    for (idx, insight) in insights.iter().enumerate() {
        let _ = writeln!(numbered, "{}. {}", idx + 1, insight.text);
    }
    format!(
        r#"Generate an action-oriented slide title (McKinsey style) based on these insights and data.

Insights:
{numbered}
Data Context:
{data}

The title should be:
- Action-oriented (starts with a verb or recommendation)
- The conclusion that the insights support
- An answer to "so what should we do?"

Return JSON only:
{{
  "actionTitle": "Action-oriented recommendation",
  "subtitle": "Brief context"
}}"#,
        data = pretty(data)
    )
}

/// Prompt asking which unit the chart values are measured in.
#[must_use]
pub fn build_units_inference_prompt(data: &ChartData) -> String {
    format!(
        r#"Infer the appropriate units for this chart data.

Data:
{data}

Return only one of: $, %, units, kg, °C, or another appropriate unit.
Return JSON only: {{ "units": "$" }}"#,
        data = pretty(data)
    )
}

#[cfg(test)]
#[path = "prompt_test.rs"]
mod tests;
