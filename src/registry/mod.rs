//! Model Registry Boundary
//!
//! The registry is the external system of record mapping model names to
//! versioned, staged artifacts. This service only reads from it: which
//! version is currently tagged production, and that version's bytes.

pub mod http;

pub use http::HttpRegistryClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle stage of a registered model version.
///
/// Stage transitions (promotion, archival) happen on the registry side
/// only; this service never writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Staging,
    Production,
    Archived,
}

/// One immutable registered model version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub name: String,
    /// Opaque registry-assigned identifier. Compared for equality only.
    pub version: String,
    pub stage: Stage,
    /// Where the artifact bytes live. Absolute URL, or a path relative to
    /// the registry base URL.
    pub artifact_uri: String,
}

/// Registry-side failures.
///
/// All of these are recoverable by a later refresh and must never take down
/// a service that already holds a working model.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry unreachable: {0}")]
    Unavailable(String),

    #[error("no production version registered for model '{0}'")]
    NoProductionModel(String),

    #[error("artifact not found for model '{name}' version {version}")]
    ArtifactNotFound { name: String, version: String },

    #[error("artifact download failed: {0}")]
    DownloadFailed(String),
}

/// Read-only client for the model registry.
///
/// Behind a trait so the model cache can be exercised against an in-memory
/// stub; the production implementation is [`HttpRegistryClient`]. No retry
/// logic lives here - the model cache owns the retry policy.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Resolve the version currently tagged production for `name`.
    async fn resolve_production(&self, name: &str) -> Result<ModelVersion, RegistryError>;

    /// Download the artifact bytes for a resolved version.
    ///
    /// Idempotent and repeatable: the same version always yields the same
    /// bytes.
    async fn fetch_artifact(&self, version: &ModelVersion) -> Result<Vec<u8>, RegistryError>;
}
