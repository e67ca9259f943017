//! Diagnosis handler
//!
//! Accepts a multipart X-ray upload, runs it through preprocessing and
//! the cached model, and answers with the label. The upload is validated
//! before the cache is touched, so a bad image never triggers a model
//! load.

use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::model::{self, DiagnosisLabel};
use crate::preprocess::preprocess;
use crate::AppState;

#[derive(Serialize)]
pub struct DiagnoseResponse {
    pub diagnosis: DiagnosisLabel,
    /// Raw pneumonia probability in [0, 1].
    pub confidence: f32,
    pub model_version: String,
    /// SHA-256 of the upload; clients may reuse it as the feedback
    /// `image_id`.
    pub image_id: String,
    pub inference_ms: u64,
}

pub async fn diagnose(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<DiagnoseResponse>> {
    let started = Instant::now();

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            upload = Some(field.bytes().await?);
            break;
        }
    }
    let bytes =
        upload.ok_or_else(|| ApiError::BadRequest("missing multipart field `image`".to_string()))?;

    let image = preprocess(&bytes)?;

    let cached = state.cache.acquire().await?;
    let result = model::predict(&cached, &image, state.config.decision_threshold)?;

    let inference_ms = started.elapsed().as_millis() as u64;
    info!(
        event = "diagnosis",
        diagnosis = %result.label,
        confidence = result.confidence,
        model_version = %result.model_version,
        image_id = %image.checksum,
        inference_ms,
        "diagnosis served"
    );

    Ok(Json(DiagnoseResponse {
        diagnosis: result.label,
        confidence: result.confidence,
        model_version: result.model_version,
        image_id: image.checksum,
        inference_ms,
    }))
}
