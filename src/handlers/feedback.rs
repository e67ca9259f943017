//! Feedback submission handler

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::feedback::{FeedbackRecord, FeedbackValue};
use crate::model::DiagnosisLabel;
use crate::AppState;

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub image_id: String,
    pub feedback: FeedbackValue,
    /// The label the user saw, echoed back for the audit record.
    #[serde(default)]
    pub diagnosis: Option<DiagnosisLabel>,
}

#[derive(Serialize)]
pub struct FeedbackResponse {
    pub message: String,
}

pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> ApiResult<Json<FeedbackResponse>> {
    if request.image_id.is_empty() {
        return Err(ApiError::BadRequest("image_id must not be empty".to_string()));
    }

    let record = FeedbackRecord::new(request.image_id, request.diagnosis, request.feedback);
    info!(
        event = "user_feedback",
        record_id = %record.id,
        image_id = %record.image_id,
        feedback = ?record.feedback,
        "feedback received"
    );

    // File IO happens off the async runtime.
    let log = state.feedback.clone();
    tokio::task::spawn_blocking(move || log.append(&record))
        .await
        .map_err(|e| ApiError::Persistence(e.to_string()))??;

    Ok(Json(FeedbackResponse {
        message: "feedback recorded".to_string(),
    }))
}
