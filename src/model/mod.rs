//! Model Module - Artifact Loading, Caching, Inference
//!
//! Owns the lifecycle of the production model: deserializing registry
//! artifacts, the single active-model slot, and the prediction entry
//! points the handlers call.

pub mod cache;
pub mod inference;
pub mod predictor;
pub mod threshold;

// Re-export common types
pub use cache::{CachedModel, ModelCache, ModelError};
pub use inference::{predict, predict_features, DiagnosisLabel, DiagnosisResult, InferenceError};
pub use predictor::{ArtifactError, ForestPredictor};
pub use threshold::Threshold;
