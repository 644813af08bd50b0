//! Service Routes

use axum::{extract::State, http::header, response::IntoResponse, Json};
use inference_engine::{FaultClass, ModelInfo};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Service banner
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub version: String,
    pub model_classes: Vec<FaultClass>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_loaded: bool,
    pub model: Option<ModelInfo>,
}

pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Bearing vibration fault detection service",
        status: "active",
        version: state.version.clone(),
        model_classes: state.engine.classes().map(<[FaultClass]>::to_vec).unwrap_or_default(),
    })
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let model = state.engine.info().cloned();

    Json(HealthResponse {
        status: if model.is_some() { "healthy" } else { "unhealthy" },
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model_loaded: model.is_some(),
        model,
    })
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
