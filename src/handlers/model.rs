//! Model info and reload handlers

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Serialize)]
pub struct ModelInfoResponse {
    pub name: String,
    /// Registry version of the cached model; null while nothing is
    /// loaded.
    pub version: Option<String>,
    pub loaded_at: Option<DateTime<Utc>>,
}

/// Reflects the cache, not the registry. A stale answer here is bounded
/// by the refresh interval; the endpoint itself never does network IO.
pub async fn info(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let current = state.cache.current();

    Json(ModelInfoResponse {
        name: state.cache.model_name().to_string(),
        version: current.as_ref().map(|m| m.version.version.clone()),
        loaded_at: current.as_ref().map(|m| m.loaded_at),
    })
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub message: String,
    pub version: String,
}

/// Operator-facing reload, typically called after a known promotion.
/// Waits for one refresh attempt; the current model keeps serving
/// throughout and survives a failed attempt.
pub async fn reload(State(state): State<AppState>) -> ApiResult<Json<ReloadResponse>> {
    info!(event = "model_reload", "explicit model reload requested");

    state.cache.refresh().await;
    let model = state.cache.current().ok_or(ApiError::ModelUnavailable)?;

    Ok(Json(ReloadResponse {
        message: "model reload complete".to_string(),
        version: model.version.version.clone(),
    }))
}
