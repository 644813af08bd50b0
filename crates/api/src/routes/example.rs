//! Example Signal Routes

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiResult;
use crate::AppState;

/// Recorded example segment
#[derive(Debug, Serialize)]
pub struct ExampleResponse {
    pub signal: Vec<f64>,
    #[serde(rename = "type")]
    pub scenario: String,
}

/// Get a recorded segment for a scenario key such as `fault/ball`
pub async fn get_example(
    State(state): State<Arc<AppState>>,
    Path(scenario): Path<String>,
) -> ApiResult<Json<ExampleResponse>> {
    let scenario = scenario.trim_start_matches('/').to_string();
    debug!("Loading example segment for {}", scenario);

    let signal = state.source.segment(&scenario)?;
    Ok(Json(ExampleResponse { signal, scenario }))
}
