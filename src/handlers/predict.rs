//! Raw feature prediction handler
//!
//! Accepts an already-extracted feature vector, skipping image
//! preprocessing. Mainly used by evaluation tooling; a wrong-length
//! vector is the caller's mistake here, not an internal defect.

use axum::extract::State;
use axum::Json;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::model::{self, DiagnosisLabel};
use crate::AppState;

#[derive(Deserialize)]
pub struct PredictRequest {
    pub features: Vec<f32>,
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub diagnosis: DiagnosisLabel,
    pub confidence: f32,
    pub model_version: String,
}

pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<Json<PredictResponse>> {
    let cached = state.cache.acquire().await?;

    let features = Array1::from_vec(request.features);
    let result = model::predict_features(&cached, &features, state.config.decision_threshold)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    info!(
        event = "prediction",
        diagnosis = %result.label,
        confidence = result.confidence,
        model_version = %result.model_version,
        "prediction served"
    );

    Ok(Json(PredictResponse {
        diagnosis: result.label,
        confidence: result.confidence,
        model_version: result.model_version,
    }))
}
