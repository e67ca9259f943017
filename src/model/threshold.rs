//! Decision Threshold
//!
//! Maps the forest's raw pneumonia probability onto a diagnosis label.
//! Kept as a validated configuration value so operators can trade
//! sensitivity for specificity without a code change.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default decision boundary.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

#[derive(Debug, Error)]
#[error("decision threshold must be within [0, 1], got {0}")]
pub struct ThresholdError(pub f32);

/// Probability cutoff for the pneumonia label, always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold(f32);

impl Threshold {
    pub fn new(value: f32) -> Result<Self, ThresholdError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ThresholdError(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// A probability at or above the cutoff reads as pneumonia.
    pub fn is_pneumonia(&self, probability: f32) -> bool {
        probability >= self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}
