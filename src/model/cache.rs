//! Active Model Cache
//!
//! One slot holding the current production model. Readers clone an `Arc`
//! out of the slot and never wait behind a refresh; the refresh builds
//! the replacement off to the side and swaps the pointer under a short
//! write lock. Refresh attempts are single-flight and run in a detached
//! task, so a disconnecting client cannot cancel a download other
//! requests are waiting on.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::registry::{ModelVersion, RegistryClient, RegistryError};

use super::predictor::{ArtifactError, ForestPredictor};

/// Deserialized model plus the registry version it was built from.
pub struct CachedModel {
    pub predictor: ForestPredictor,
    pub version: ModelVersion,
    pub loaded_at: DateTime<Utc>,
    pub load_time: Duration,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no model loaded yet")]
    Unavailable,
}

#[derive(Debug, Error)]
enum RefreshError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("artifact for version {version} is invalid: {source}")]
    InvalidArtifact {
        version: String,
        source: ArtifactError,
    },
}

struct CacheInner {
    registry: Arc<dyn RegistryClient>,
    model_name: String,
    refresh_interval: Duration,
    slot: RwLock<Option<Arc<CachedModel>>>,
    last_check: Mutex<Option<Instant>>,
    // Receiver for the in-flight refresh, if one is running. The attempt
    // flips the watch value to true exactly once, when it finishes.
    inflight: Mutex<Option<watch::Receiver<bool>>>,
}

#[derive(Clone)]
pub struct ModelCache {
    inner: Arc<CacheInner>,
}

impl ModelCache {
    pub fn new(
        registry: Arc<dyn RegistryClient>,
        model_name: impl Into<String>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                registry,
                model_name: model_name.into(),
                refresh_interval,
                slot: RwLock::new(None),
                last_check: Mutex::new(None),
                inflight: Mutex::new(None),
            }),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.inner.model_name
    }

    /// Current model without touching the registry.
    pub fn current(&self) -> Option<Arc<CachedModel>> {
        self.inner.slot.read().clone()
    }

    /// Model handle for serving one request.
    ///
    /// With a model cached this returns immediately, kicking off a
    /// background refresh when the check interval has elapsed. With the
    /// slot empty it waits for one load attempt and fails only if the
    /// slot is still empty afterwards.
    pub async fn acquire(&self) -> Result<Arc<CachedModel>, ModelError> {
        if let Some(model) = self.current() {
            if self.refresh_due() {
                self.trigger_refresh();
            }
            return Ok(model);
        }

        self.refresh().await;
        self.current().ok_or(ModelError::Unavailable)
    }

    /// Run one refresh attempt and wait for it to finish, joining the
    /// in-flight attempt if one is already running.
    pub async fn refresh(&self) {
        let mut rx = self.subscribe();
        if !*rx.borrow_and_update() {
            // Err means the attempt task is gone; either way it is over.
            let _ = rx.changed().await;
        }
    }

    /// Kick off a refresh without waiting for its outcome.
    pub fn trigger_refresh(&self) {
        let _ = self.subscribe();
    }

    /// Poll the registry until a model loads, then stop. Gives up after
    /// `timeout` so a dead registry does not leave a phantom task behind;
    /// requests keep attempting lazy loads regardless.
    pub async fn warm_up(&self, poll: Duration, timeout: Duration) {
        let started = Instant::now();
        loop {
            self.refresh().await;
            if let Some(model) = self.current() {
                info!(
                    model = %self.inner.model_name,
                    version = %model.version.version,
                    "startup model load complete"
                );
                return;
            }
            if started.elapsed() >= timeout {
                error!(
                    model = %self.inner.model_name,
                    timeout_secs = timeout.as_secs(),
                    "gave up waiting for a production model"
                );
                return;
            }
            tokio::time::sleep(poll).await;
        }
    }

    fn refresh_due(&self) -> bool {
        match *self.inner.last_check.lock() {
            Some(at) => at.elapsed() >= self.inner.refresh_interval,
            None => true,
        }
    }

    /// Subscribe to the in-flight refresh attempt, starting one if none
    /// is running. Collapsing concurrent triggers here is what keeps
    /// resolve + download single-flight.
    fn subscribe(&self) -> watch::Receiver<bool> {
        let mut inflight = self.inner.inflight.lock();
        if let Some(rx) = inflight.as_ref() {
            return rx.clone();
        }

        let (tx, rx) = watch::channel(false);
        *inflight = Some(rx.clone());

        let cache = self.clone();
        tokio::spawn(async move {
            cache.run_attempt().await;
            // Clear before notifying so late triggers start a fresh attempt.
            *cache.inner.inflight.lock() = None;
            let _ = tx.send(true);
        });

        rx
    }

    async fn run_attempt(&self) {
        let started = Instant::now();
        let outcome = self.load_if_changed().await;
        // Failures count as a check too, so a dead registry is probed at
        // most once per interval instead of once per request.
        *self.inner.last_check.lock() = Some(Instant::now());

        match outcome {
            Ok(Some(version)) => {
                info!(
                    model = %self.inner.model_name,
                    version = %version,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "model refreshed"
                );
            }
            Ok(None) => {}
            Err(e) => {
                if self.current().is_some() {
                    warn!(
                        model = %self.inner.model_name,
                        error = %e,
                        "model refresh failed, keeping cached model"
                    );
                } else {
                    error!(
                        model = %self.inner.model_name,
                        error = %e,
                        "model refresh failed, no model available"
                    );
                }
            }
        }
    }

    /// Resolve the production version and load it if it differs from the
    /// cached one. Returns the new version string when a swap happened.
    async fn load_if_changed(&self) -> Result<Option<String>, RefreshError> {
        let inner = &self.inner;
        let version = inner.registry.resolve_production(&inner.model_name).await?;

        if let Some(current) = self.current() {
            if current.version.version == version.version {
                return Ok(None);
            }
        }

        let started = Instant::now();
        let bytes = inner.registry.fetch_artifact(&version).await?;
        let predictor =
            ForestPredictor::from_bytes(&bytes).map_err(|source| RefreshError::InvalidArtifact {
                version: version.version.clone(),
                source,
            })?;

        let model = Arc::new(CachedModel {
            predictor,
            version,
            loaded_at: Utc::now(),
            load_time: started.elapsed(),
        });
        let swapped = model.version.version.clone();
        // The write lock is held only for the pointer swap; in-flight
        // inferences keep their own Arc to the old model.
        *inner.slot.write() = Some(model);

        Ok(Some(swapped))
    }
}
