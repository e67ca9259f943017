//! Inference Engine
//!
//! Pure mapping from (cached model, feature vector, threshold) to a
//! diagnosis. No registry access, no shared state; everything stateful
//! lives in the cache.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preprocess::PreprocessedImage;

use super::cache::CachedModel;
use super::threshold::Threshold;

/// Closed label set returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiagnosisLabel {
    Normal,
    Pneumonia,
}

impl std::fmt::Display for DiagnosisLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Pneumonia => write!(f, "PNEUMONIA"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisResult {
    pub label: DiagnosisLabel,
    /// Raw pneumonia probability in [0, 1].
    pub confidence: f32,
    /// Registry version string of the model that produced this result.
    pub model_version: String,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("feature vector has {actual} values, model expects {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// Diagnose a preprocessed upload.
pub fn predict(
    model: &CachedModel,
    image: &PreprocessedImage,
    threshold: Threshold,
) -> Result<DiagnosisResult, InferenceError> {
    predict_features(model, &image.pixels, threshold)
}

/// Diagnose a raw feature vector.
pub fn predict_features(
    model: &CachedModel,
    features: &Array1<f32>,
    threshold: Threshold,
) -> Result<DiagnosisResult, InferenceError> {
    let expected = model.predictor.n_features();
    if features.len() != expected {
        return Err(InferenceError::ShapeMismatch {
            expected,
            actual: features.len(),
        });
    }

    let probability = model.predictor.predict_proba(features);
    let label = if threshold.is_pneumonia(probability) {
        DiagnosisLabel::Pneumonia
    } else {
        DiagnosisLabel::Normal
    };

    Ok(DiagnosisResult {
        label,
        confidence: probability,
        model_version: model.version.version.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::predictor::ForestPredictor;
    use crate::registry::{ModelVersion, Stage};
    use serde_json::json;

    fn test_model(n_features: usize, leaf: f32) -> CachedModel {
        let bytes = json!({
            "model_type": "random_forest",
            "n_features": n_features,
            "trees": [{"nodes": [{"value": leaf}]}],
        })
        .to_string()
        .into_bytes();

        CachedModel {
            predictor: ForestPredictor::from_bytes(&bytes).unwrap(),
            version: ModelVersion {
                name: "chest-xray".to_string(),
                version: "7".to_string(),
                stage: Stage::Production,
                artifact_uri: "artifacts/7".to_string(),
            },
            loaded_at: chrono::Utc::now(),
            load_time: std::time::Duration::from_millis(1),
        }
    }

    #[test]
    fn test_label_follows_threshold() {
        let model = test_model(3, 0.6);
        let features = Array1::from_vec(vec![0.0, 0.0, 0.0]);

        let result = predict_features(&model, &features, Threshold::new(0.5).unwrap()).unwrap();
        assert_eq!(result.label, DiagnosisLabel::Pneumonia);
        assert!((result.confidence - 0.6).abs() < 1e-6);
        assert_eq!(result.model_version, "7");

        let result = predict_features(&model, &features, Threshold::new(0.7).unwrap()).unwrap();
        assert_eq!(result.label, DiagnosisLabel::Normal);
    }

    #[test]
    fn test_identical_calls_identical_results() {
        let model = test_model(2, 0.3);
        let features = Array1::from_vec(vec![0.25, 0.75]);
        let threshold = Threshold::default();

        let first = predict_features(&model, &features, threshold).unwrap();
        let second = predict_features(&model, &features, threshold).unwrap();
        assert_eq!(first.label, second.label);
        assert_eq!(first.confidence, second.confidence);
        // Inputs come back untouched.
        assert_eq!(features, Array1::from_vec(vec![0.25, 0.75]));
    }

    #[test]
    fn test_shape_mismatch() {
        let model = test_model(4, 0.5);
        let features = Array1::from_vec(vec![0.0; 3]);

        let err = predict_features(&model, &features, Threshold::default()).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::ShapeMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(
            serde_json::to_string(&DiagnosisLabel::Pneumonia).unwrap(),
            "\"PNEUMONIA\""
        );
        assert_eq!(
            serde_json::to_string(&DiagnosisLabel::Normal).unwrap(),
            "\"NORMAL\""
        );
    }
}
