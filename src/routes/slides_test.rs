use super::*;
use crate::chart::{ChartAction, ChartConfiguration};
use crate::state::test_helpers::{StubAssistant, test_app_state};

fn state() -> AppState {
    test_app_state(StubAssistant::new(vec![]))
}

#[tokio::test]
async fn slide_reflects_current_chart() {
    let state = state();
    state
        .chart
        .apply(ChartAction::SetTitle { title: "Revenue Mix".into() })
        .await
        .unwrap();
    let Json(content) = generate_slide(State(state)).await;
    assert_eq!(content.chart_title, "Revenue Mix");
    assert_eq!(content.insights.len(), 5);
}

#[tokio::test]
async fn action_title_falls_back_locally() {
    let mut data = ChartConfiguration::sample().data;
    data.description = Some("Aim: double Product A".into());
    let Json(title) = action_title(State(state()), Json(ActionTitleBody { insights: vec![], data })).await;
    assert_eq!(title.action_title, "Optimize Product A to double product a");
}

#[tokio::test]
async fn units_fall_back_locally() {
    let data = ChartConfiguration::sample().data;
    let Json(resp) = infer_units(State(state()), Json(UnitsBody { data })).await;
    assert_eq!(resp.units, "units");
}

#[test]
fn action_title_body_parses_camel_case_data() {
    let body: ActionTitleBody = serde_json::from_str(
        r#"{"data":{"dataPoints":[],"xAxisKey":"month","seriesNames":[]}}"#,
    )
    .unwrap();
    assert!(body.insights.is_empty());
    assert_eq!(body.data.x_axis_key, "month");
}
