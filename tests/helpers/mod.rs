//! Shared test fixtures: an in-memory registry stub with call counters,
//! artifact builders and app wiring.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::Semaphore;

use pneumoscan::feedback::FeedbackLog;
use pneumoscan::model::{ModelCache, Threshold};
use pneumoscan::registry::{ModelVersion, RegistryClient, RegistryError, Stage};
use pneumoscan::{AppState, Config};

pub const MODEL_NAME: &str = "chest-xray-rf";

/// Registry double. Tracks call counts and can be flipped into failure
/// modes mid-test.
#[derive(Default)]
pub struct StubRegistry {
    production: Mutex<Option<ModelVersion>>,
    artifacts: Mutex<HashMap<String, Vec<u8>>>,
    resolve_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    unreachable: AtomicBool,
    fail_downloads: AtomicBool,
    resolve_gate: Mutex<Option<Arc<Semaphore>>>,
}

impl StubRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_model(version: &str, artifact: Vec<u8>) -> Arc<Self> {
        let stub = Self::new();
        stub.promote(version, artifact);
        stub
    }

    /// Tag `version` as the production model and register its artifact.
    pub fn promote(&self, version: &str, artifact: Vec<u8>) {
        *self.production.lock() = Some(ModelVersion {
            name: MODEL_NAME.to_string(),
            version: version.to_string(),
            stage: Stage::Production,
            artifact_uri: format!("api/2.0/artifacts/{}/{}", MODEL_NAME, version),
        });
        self.artifacts.lock().insert(version.to_string(), artifact);
    }

    pub fn set_unreachable(&self, value: bool) {
        self.unreachable.store(value, Ordering::SeqCst);
    }

    pub fn set_fail_downloads(&self, value: bool) {
        self.fail_downloads.store(value, Ordering::SeqCst);
    }

    /// Make resolves block until permits are added, so a test can hold a
    /// refresh attempt open while piling up concurrent triggers.
    pub fn gate_resolves(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.resolve_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn resolve_count(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryClient for StubRegistry {
    async fn resolve_production(&self, name: &str) -> Result<ModelVersion, RegistryError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.resolve_gate.lock().clone();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| RegistryError::Unavailable("gate closed".to_string()))?;
            permit.forget();
        }

        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable("connection refused".to_string()));
        }

        self.production
            .lock()
            .clone()
            .ok_or_else(|| RegistryError::NoProductionModel(name.to_string()))
    }

    async fn fetch_artifact(&self, version: &ModelVersion) -> Result<Vec<u8>, RegistryError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if self.unreachable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable("connection refused".to_string()));
        }
        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(RegistryError::DownloadFailed("stream reset".to_string()));
        }

        self.artifacts
            .lock()
            .get(&version.version)
            .cloned()
            .ok_or_else(|| RegistryError::ArtifactNotFound {
                name: version.name.clone(),
                version: version.version.clone(),
            })
    }
}

/// Forest of one constant tree: every prediction returns `leaf`.
pub fn constant_forest(n_features: usize, leaf: f32) -> Vec<u8> {
    json!({
        "model_type": "random_forest",
        "n_features": n_features,
        "trees": [{"nodes": [{"value": leaf}]}],
    })
    .to_string()
    .into_bytes()
}

/// Forest of one stump on feature 0: probability 0.2 for dark images,
/// 0.8 for bright ones. Makes diagnose labels predictable from the
/// upload shade.
pub fn stump_forest(n_features: usize) -> Vec<u8> {
    json!({
        "model_type": "random_forest",
        "n_features": n_features,
        "trees": [{
            "nodes": [
                {"feature": 0, "threshold": 0.5, "left": 1, "right": 2},
                {"value": 0.2},
                {"value": 0.8},
            ]
        }],
    })
    .to_string()
    .into_bytes()
}

/// PNG of a uniform grayscale image.
pub fn test_png(shade: u8) -> Vec<u8> {
    let img = image::GrayImage::from_pixel(96, 96, image::Luma([shade]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageLuma8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
    bytes
}

pub fn test_config(feedback_dir: &Path, refresh_interval: Duration) -> Config {
    Config {
        registry_url: "http://registry.test".to_string(),
        model_name: MODEL_NAME.to_string(),
        port: 0,
        registry_timeout: Duration::from_secs(1),
        refresh_interval,
        decision_threshold: Threshold::new(0.5).unwrap(),
        feedback_dir: feedback_dir.to_path_buf(),
    }
}

pub fn test_state(
    registry: Arc<StubRegistry>,
    feedback_dir: &Path,
    refresh_interval: Duration,
) -> AppState {
    AppState {
        cache: ModelCache::new(registry, MODEL_NAME, refresh_interval),
        feedback: Arc::new(FeedbackLog::new(feedback_dir).unwrap()),
        config: test_config(feedback_dir, refresh_interval),
    }
}
