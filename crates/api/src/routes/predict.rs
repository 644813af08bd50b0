//! Prediction Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use feature_engine::{FeatureMap, Signal, DEFAULT_SAMPLING_RATE};
use inference_engine::{Analysis, FaultClass};
use metrics::counter;
use report::ReportBundle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Raw signal submitted for analysis
#[derive(Debug, Clone, Deserialize)]
pub struct SignalRequest {
    pub signal: Vec<f64>,
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: u32,
}

fn default_sampling_rate() -> u32 {
    DEFAULT_SAMPLING_RATE
}

/// Response for the predict endpoint
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: FaultClass,
    pub confidence: f64,
    pub probabilities: BTreeMap<FaultClass, f64>,
    pub features: FeatureMap,
    pub signal: Vec<f64>,
}

fn analyze(state: &AppState, request: SignalRequest) -> ApiResult<(Signal, Analysis)> {
    let signal = Signal::new(request.signal, request.sampling_rate);
    match state.engine.analyze(&signal) {
        Ok(analysis) => {
            counter!("bearing_predictions_total", "outcome" => "ok", "source" => "request")
                .increment(1);
            Ok((signal, analysis))
        }
        Err(e) => {
            counter!("bearing_predictions_total", "outcome" => "error", "source" => "request")
                .increment(1);
            Err(e.into())
        }
    }
}

fn decode(payload: Result<Json<SignalRequest>, JsonRejection>) -> ApiResult<SignalRequest> {
    payload
        .map(|Json(request)| request)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Classify a raw signal
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignalRequest>, JsonRejection>,
) -> ApiResult<Json<PredictResponse>> {
    let (signal, analysis) = analyze(&state, decode(payload)?)?;

    info!(
        "Predicted {} ({:.3}) for {} samples",
        analysis.result.label,
        analysis.result.confidence,
        signal.len()
    );

    Ok(Json(PredictResponse {
        prediction: analysis.result.label,
        confidence: analysis.result.confidence,
        probabilities: analysis.result.probabilities,
        features: analysis.features,
        signal: signal.into_samples(),
    }))
}

/// Assemble the data bundle for a diagnostic report
pub async fn diagnostic_report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignalRequest>, JsonRejection>,
) -> ApiResult<Json<ReportBundle>> {
    let (signal, analysis) = analyze(&state, decode(payload)?)?;
    Ok(Json(ReportBundle::assemble(signal, analysis.features, analysis.result)))
}
