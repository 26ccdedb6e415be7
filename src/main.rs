mod chart;
mod error;
mod llm;
mod routes;
mod services;
mod state;

use llm::config::{ANTHROPIC_KEY_VAR, AiConfig, GEMINI_KEY_VAR};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AiConfig::from_env();
    if !config.anthropic.is_configured() {
        tracing::warn!(var = ANTHROPIC_KEY_VAR, "Claude not configured");
    }
    if !config.gemini.is_configured() {
        tracing::warn!(var = GEMINI_KEY_VAR, "Gemini not configured");
    }

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let state = state::AppState::from_config(&config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(
        %port,
        claude_model = %config.anthropic.model,
        gemini_model = %config.gemini.model,
        "smartchart listening"
    );
    axum::serve(listener, app).await.expect("server failed");
}
