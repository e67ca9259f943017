//! PneumoScan - Chest X-ray Inference Service
//!
//! Serves diagnoses from the model currently promoted to production in
//! an external model registry. The registry owns versioning and
//! promotion; this service resolves, downloads and caches the
//! production model and keeps serving the cached one when the registry
//! is unreachable.

pub mod config;
pub mod error;
pub mod feedback;
pub mod handlers;
pub mod model;
pub mod preprocess;
pub mod registry;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{ApiError, ApiResult};

use feedback::FeedbackLog;
use model::ModelCache;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cache: ModelCache,
    pub feedback: Arc<FeedbackLog>,
    pub config: Config,
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/diagnose", post(handlers::diagnose::diagnose))
        .route("/predict", post(handlers::predict::predict))
        .route("/model-info", get(handlers::model::info))
        .route("/reload-model", post(handlers::model::reload))
        .route("/feedback", post(handlers::feedback::submit))
        .layer(DefaultBodyLimit::max(config::MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
