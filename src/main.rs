//! PneumoScan Server
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  multipart  ┌─────────────────────────────┐
//! │ Browser  │ ───────────▶│  Axum HTTP surface          │
//! └──────────┘             │   preprocess ─▶ inference   │
//!                          │        │                    │
//!                          │   ┌────▼─────┐  stale/      │
//!                          │   │  Model   │  reload      │
//!                          │   │  Cache   │────────┐     │
//!                          │   └──────────┘        │     │
//!                          └─────────────────────── │ ────┘
//!                                                   ▼
//!                                          ┌────────────────┐
//!                                          │ Model Registry │
//!                                          │  (production)  │
//!                                          └────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pneumoscan::config::{Config, WARMUP_POLL, WARMUP_TIMEOUT};
use pneumoscan::feedback::FeedbackLog;
use pneumoscan::model::ModelCache;
use pneumoscan::registry::HttpRegistryClient;
use pneumoscan::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pneumoscan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("PneumoScan server starting...");
    tracing::info!("Registry: {} (model `{}`)", config.registry_url, config.model_name);

    let registry = Arc::new(HttpRegistryClient::new(
        &config.registry_url,
        config.registry_timeout,
    ));
    let cache = ModelCache::new(registry, config.model_name.clone(), config.refresh_interval);
    let feedback = Arc::new(FeedbackLog::new(&config.feedback_dir)?);

    // First model load happens in the background; requests arriving
    // before it completes get 503 rather than blocking startup.
    let warmup = cache.clone();
    tokio::spawn(async move {
        warmup.warm_up(WARMUP_POLL, WARMUP_TIMEOUT).await;
    });

    let state = AppState {
        cache,
        feedback,
        config: config.clone(),
    };
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
