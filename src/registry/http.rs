//! HTTP registry client.
//!
//! Speaks the registry's read API:
//! `GET {base}/api/2.0/models/{name}/production` resolves the production
//! version as JSON, and a GET on the version's `artifact_uri` returns the
//! raw artifact bytes.

use std::time::Duration;

use async_trait::async_trait;

use super::{ModelVersion, RegistryClient, RegistryError};

pub struct HttpRegistryClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRegistryClient {
    /// Create a client against `base_url` with a per-request timeout.
    ///
    /// The timeout bounds both resolution and artifact download; an elapsed
    /// timeout surfaces as `RegistryUnavailable` rather than hanging a
    /// refresh.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Absolute artifact URLs are used as-is; anything else is joined to
    /// the registry base.
    fn artifact_url(&self, artifact_uri: &str) -> String {
        if artifact_uri.starts_with("http://") || artifact_uri.starts_with("https://") {
            artifact_uri.to_string()
        } else {
            format!("{}/{}", self.base_url, artifact_uri.trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl RegistryClient for HttpRegistryClient {
    async fn resolve_production(&self, name: &str) -> Result<ModelVersion, RegistryError> {
        let url = format!("{}/api/2.0/models/{}/production", self.base_url, name);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NoProductionModel(name.to_string()));
        }
        if !response.status().is_success() {
            return Err(RegistryError::Unavailable(format!(
                "registry returned {} for {}",
                response.status(),
                url
            )));
        }

        response
            .json::<ModelVersion>()
            .await
            .map_err(|e| RegistryError::Unavailable(format!("malformed registry response: {}", e)))
    }

    async fn fetch_artifact(&self, version: &ModelVersion) -> Result<Vec<u8>, RegistryError> {
        let url = self.artifact_url(&version.artifact_uri);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                RegistryError::Unavailable(e.to_string())
            } else {
                RegistryError::DownloadFailed(e.to_string())
            }
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::ArtifactNotFound {
                name: version.name.clone(),
                version: version.version.clone(),
            });
        }
        if !response.status().is_success() {
            return Err(RegistryError::DownloadFailed(format!(
                "registry returned {} for {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RegistryError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }
}
