//! Feedback Module - Diagnosis Feedback Log
//!
//! Append-only JSONL records linking a served diagnosis to the user's
//! verdict, kept for model evaluation and retraining triage. Duplicate
//! submissions for one image are tolerated and left to later readers.

pub mod record;
pub mod writer;


// Re-export common types
pub use record::{FeedbackRecord, FeedbackValue};
pub use writer::{FeedbackError, FeedbackLog};
