//! Live Streaming Routes

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use streaming::{StreamEvent, StreamMode, StreamSession};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, Stream, StreamExt};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for the stream endpoint
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// `real` (default) or `random`
    pub mode: Option<String>,
    /// Seed for reproducible scenario selection and synthesis
    pub seed: Option<u64>,
}

fn to_sse(event: StreamEvent) -> Option<Event> {
    let name = event.event_name();
    match Event::default().json_data(&event) {
        Ok(sse) => Some(match name {
            Some(name) => sse.event(name),
            None => sse,
        }),
        Err(e) => {
            warn!("Dropping unserializable stream event: {}", e);
            None
        }
    }
}

/// Stream samples and rolling predictions as server-sent events
pub async fn stream_signal(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StreamQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let mode = match params.mode.as_deref() {
        None => StreamMode::default(),
        Some(raw) => StreamMode::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown stream mode '{}'", raw)))?,
    };

    let session = StreamSession::new(
        mode,
        state.stream.clone(),
        Arc::clone(&state.source),
        Arc::clone(&state.engine),
        params.seed,
    );

    let (tx, rx) = mpsc::channel(state.stream.channel_capacity);
    tokio::spawn(session.run(tx));
    info!("Stream opened (mode: {}, seed: {:?})", mode, params.seed);

    let events = ReceiverStream::new(rx).filter_map(to_sse).map(Ok);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
