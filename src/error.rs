//! Error handling
//!
//! Domain errors stay typed inside their modules; this is the single
//! point where they turn into HTTP responses. Registry errors never
//! appear here because the cache contains them.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::feedback::FeedbackError;
use crate::model::{InferenceError, ModelError};
use crate::preprocess::PreprocessError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    // Service state
    ModelUnavailable,

    // Client input errors
    BadRequest(String),
    UnsupportedMedia(String),

    // Internal errors
    Inference(String),
    Persistence(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::ModelUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "no model loaded yet, try again shortly",
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            ApiError::UnsupportedMedia(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg.as_str()),
            ApiError::Inference(msg) => {
                tracing::error!("Inference contract violation: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "inference failed")
            }
            ApiError::Persistence(msg) => {
                tracing::error!("Feedback persistence error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "feedback could not be recorded",
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ModelError> for ApiError {
    fn from(_: ModelError) -> Self {
        ApiError::ModelUnavailable
    }
}

impl From<PreprocessError> for ApiError {
    fn from(err: PreprocessError) -> Self {
        match err {
            PreprocessError::UnsupportedFormat(_) => ApiError::UnsupportedMedia(err.to_string()),
            PreprocessError::EmptyInput | PreprocessError::Decode(_) => {
                ApiError::BadRequest(err.to_string())
            }
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        ApiError::Inference(err.to_string())
    }
}

impl From<FeedbackError> for ApiError {
    fn from(err: FeedbackError) -> Self {
        ApiError::Persistence(err.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        ApiError::BadRequest(format!("malformed multipart body: {}", err))
    }
}
