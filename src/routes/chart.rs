//! Chart store routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use crate::chart::{ChartAction, ChartConfiguration};
use crate::error::ApiError;
use crate::state::{AppState, ChartSnapshot, StoreError};

/// `GET /api/chart`: current configuration, version and sources.
pub async fn get_chart(State(state): State<AppState>) -> Json<ChartSnapshot> {
    Json(state.chart.snapshot().await)
}

/// `PUT /api/chart`: replace the whole configuration.
pub async fn replace_chart(
    State(state): State<AppState>,
    Json(configuration): Json<ChartConfiguration>,
) -> Result<Json<ChartSnapshot>, ApiError> {
    let snapshot = state
        .chart
        .replace(configuration)
        .await
        .map_err(store_error_to_api)?;
    tracing::info!(version = snapshot.version, "chart: configuration replaced");
    Ok(Json(snapshot))
}

/// `POST /api/chart/actions`: apply one named manual edit.
pub async fn apply_action(
    State(state): State<AppState>,
    Json(action): Json<ChartAction>,
) -> Result<Json<ChartSnapshot>, ApiError> {
    let snapshot = state
        .chart
        .apply(action)
        .await
        .map_err(store_error_to_api)?;
    Ok(Json(snapshot))
}

pub(crate) fn store_error_to_api(err: StoreError) -> ApiError {
    let status = match err {
        StoreError::Stale { .. } => StatusCode::CONFLICT,
        StoreError::Chart(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    ApiError::new(status, &err)
}

#[cfg(test)]
#[path = "chart_test.rs"]
mod tests;
