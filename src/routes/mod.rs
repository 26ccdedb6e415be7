//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON API for the browser front end: the chart store, the chat session and
//! slide generation. CORS is open because the front end is served from a
//! different origin during development.

pub mod chart;
pub mod chat;
pub mod slides;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/chart", get(chart::get_chart).put(chart::replace_chart))
        .route("/api/chart/actions", post(chart::apply_action))
        .route(
            "/api/chat/messages",
            get(chat::list_messages)
                .post(chat::send_message)
                .delete(chat::clear_messages),
        )
        .route("/api/chat/retry", post(chat::retry_last_message))
        .route("/api/chat/messages/{index}/feedback", post(chat::set_feedback))
        .route("/api/slides", post(slides::generate_slide))
        .route("/api/slides/title", post(slides::action_title))
        .route("/api/slides/units", post(slides::infer_units))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
