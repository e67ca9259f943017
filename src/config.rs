//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::model::Threshold;

/// Startup warmup: poll cadence and how long to keep trying before the
/// warmup task gives up. Lazy loads keep happening either way.
pub const WARMUP_POLL: Duration = Duration::from_secs(5);
pub const WARMUP_TIMEOUT: Duration = Duration::from_secs(600);

/// Upload size cap for the diagnose endpoint.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Model registry base URL
    pub registry_url: String,

    /// Registered model name to serve
    pub model_name: String,

    /// Server port
    pub port: u16,

    /// Timeout for registry resolution and artifact downloads
    pub registry_timeout: Duration,

    /// Minimum gap between lazy production-version checks
    pub refresh_interval: Duration,

    /// Probability cutoff for the pneumonia label
    pub decision_threshold: Threshold,

    /// Directory for the feedback JSONL log
    pub feedback_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables. Unset variables
    /// fall back to defaults; a present but invalid threshold is a
    /// startup error rather than a silent fallback.
    pub fn from_env() -> anyhow::Result<Self> {
        let decision_threshold = match env::var("DECISION_THRESHOLD") {
            Ok(raw) => Threshold::new(raw.parse::<f32>()?)?,
            Err(_) => Threshold::default(),
        };

        Ok(Self {
            registry_url: env::var("REGISTRY_URL")
                .unwrap_or_else(|_| "http://localhost:5000".to_string()),

            model_name: env::var("MODEL_NAME").unwrap_or_else(|_| "RandomForest".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5001),

            registry_timeout: Duration::from_secs(
                env::var("REGISTRY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),

            refresh_interval: Duration::from_secs(
                env::var("REFRESH_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),

            decision_threshold,

            feedback_dir: env::var("FEEDBACK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("feedback")),
        })
    }
}
