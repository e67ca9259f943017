use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::DiagnosisLabel;

/// User verdict on a served diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackValue {
    Correct,
    Incorrect,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct FeedbackRecord {
    /// Server-assigned record id; `image_id` is caller-supplied and not
    /// assumed unique.
    pub id: Uuid,
    pub image_id: String,
    /// The label the user was shown, when the caller echoes it back.
    pub diagnosis: Option<DiagnosisLabel>,
    pub feedback: FeedbackValue,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    pub fn new(
        image_id: impl Into<String>,
        diagnosis: Option<DiagnosisLabel>,
        feedback: FeedbackValue,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            image_id: image_id.into(),
            diagnosis,
            feedback,
            timestamp: Utc::now(),
        }
    }
}
