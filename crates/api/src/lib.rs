//! Bearing Diagnostics API Server
//!
//! HTTP surface over the feature extraction and classification pipeline:
//! single-shot prediction, diagnostic report data, recorded examples and a
//! live SSE stream.

use axum::{
    routing::{get, post},
    Router,
};
use inference_engine::InferenceEngine;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use streaming::{DirectorySource, SegmentSource, StreamConfig};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
mod routes;

pub use config::{AppConfig, ConfigError, LoggingConfig};
pub use error::{ApiError, ApiResult};

/// Application state shared across handlers
pub struct AppState {
    /// Classifier adapter, possibly without a model
    pub engine: Arc<InferenceEngine>,
    /// Recorded segment source
    pub source: Arc<dyn SegmentSource>,
    /// Streaming session settings
    pub stream: StreamConfig,
    /// Prometheus render handle
    pub metrics: PrometheusHandle,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        engine: Arc<InferenceEngine>,
        source: Arc<dyn SegmentSource>,
        stream: StreamConfig,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            engine,
            source,
            stream,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Build state from configuration, loading the model artifact
    ///
    /// A model that fails to load leaves the service running but unhealthy.
    pub fn from_config(config: &AppConfig, metrics: PrometheusHandle) -> Self {
        let engine = match InferenceEngine::load(&config.model.manifest) {
            Ok(engine) => engine.with_validation(config.validation.clone()),
            Err(e) => {
                error!(
                    "Failed to load model from {}: {}",
                    config.model.manifest.display(),
                    e
                );
                InferenceEngine::unloaded()
            }
        };

        info!("Serving recorded segments from {}", config.dataset.directory.display());
        let source = DirectorySource::new(config.dataset.directory.clone());

        Self::new(
            Arc::new(engine),
            Arc::new(source),
            config.stream.clone(),
            metrics,
        )
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::system::root))
        .route("/health", get(routes::system::health))
        .route("/metrics", get(routes::system::metrics))
        .route("/predict", post(routes::predict::predict))
        .route("/diagnostic-report", post(routes::predict::diagnostic_report))
        .route("/example/*scenario", get(routes::example::get_example))
        .route("/stream-signal", get(routes::stream::stream_signal))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid log level '{}'", config.level))?;

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr()?;
    let metrics = install_metrics()?;

    let state = Arc::new(AppState::from_config(&config, metrics));
    if !state.engine.is_loaded() {
        error!("Starting without a model: inference requests will return 503");
    }
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
