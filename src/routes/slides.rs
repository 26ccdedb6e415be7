//! Slide generation routes.

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::chart::ChartData;
use crate::services::slides::{ActionTitle, SlideContent, SlideInsight};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ActionTitleBody {
    #[serde(default)]
    pub insights: Vec<SlideInsight>,
    pub data: ChartData,
}

#[derive(Deserialize)]
pub struct UnitsBody {
    pub data: ChartData,
}

#[derive(Serialize)]
pub struct UnitsResponse {
    pub units: String,
}

/// `POST /api/slides`: slide content for the current chart.
pub async fn generate_slide(State(state): State<AppState>) -> Json<SlideContent> {
    let snapshot = state.chart.snapshot().await;
    Json(
        state
            .slides
            .generate_slide_content(&snapshot.configuration)
            .await,
    )
}

/// `POST /api/slides/title`: action title for given insights.
pub async fn action_title(State(state): State<AppState>, Json(body): Json<ActionTitleBody>) -> Json<ActionTitle> {
    Json(
        state
            .slides
            .generate_action_title(&body.insights, &body.data)
            .await,
    )
}

/// `POST /api/slides/units`: units label for chart data.
pub async fn infer_units(State(state): State<AppState>, Json(body): Json<UnitsBody>) -> Json<UnitsResponse> {
    Json(UnitsResponse { units: state.slides.infer_units(&body.data).await })
}

#[cfg(test)]
#[path = "slides_test.rs"]
mod tests;
