//! Health check handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model_loaded: bool,
    model_version: Option<String>,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let current = state.cache.current();

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model_loaded: current.is_some(),
        model_version: current.map(|m| m.version.version.clone()),
    })
}
