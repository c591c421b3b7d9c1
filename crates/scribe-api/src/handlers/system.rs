//! Health and configuration probes.

use axum::extract::State;
use axum::Json;

use crate::AppState;

/// Feature availability: which credentials are present in the environment.
pub async fn config_status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "deepseek": state.analyzer.is_some(),
        "notion": state.config.notion_configured(),
    }))
}

/// Liveness probe.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "scribe-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
