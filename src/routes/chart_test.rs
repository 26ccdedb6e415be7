use super::*;
use crate::chart::{ChartError, ChartType};
use crate::state::test_helpers::{StubAssistant, test_app_state};

fn state() -> AppState {
    test_app_state(StubAssistant::new(vec![]))
}

#[tokio::test]
async fn get_chart_returns_sample_snapshot() {
    let Json(snap) = get_chart(State(state())).await;
    assert_eq!(snap.version, 0);
    assert_eq!(snap.configuration, ChartConfiguration::sample());
}

#[tokio::test]
async fn apply_action_bumps_version() {
    let state = state();
    let Json(snap) = apply_action(State(state.clone()), Json(ChartAction::SetChartType { chart_type: ChartType::Line }))
        .await
        .unwrap();
    assert_eq!(snap.version, 1);
    assert_eq!(state.chart.snapshot().await.configuration.styling.chart_type, ChartType::Line);
}

#[tokio::test]
async fn apply_action_unknown_series_is_unprocessable() {
    let err = apply_action(State(state()), Json(ChartAction::ToggleSeries { series: "Ghost".into() }))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.code, "E_UNKNOWN_SERIES");
}

#[tokio::test]
async fn replace_chart_rejects_invalid_configuration() {
    let mut bad = ChartConfiguration::sample();
    bad.data.series_names.push("Missing".into());
    let err = replace_chart(State(state()), Json(bad)).await.unwrap_err();
    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(err.code, "E_SERIES_MISSING");
}

#[test]
fn store_error_to_api_maps_stale_to_conflict() {
    let err = store_error_to_api(StoreError::Stale { expected: 1, actual: 2 });
    assert_eq!(err.status, StatusCode::CONFLICT);
    assert!(err.retryable);

    let err = store_error_to_api(StoreError::Chart(ChartError::SeriesIsAxisKey("quarter".into())));
    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
}
