//! Stream Session Implementation
//!
//! A session alternates between two states. `Idle` selects the next scenario
//! and clears the buffer; `Emitting` hands out one sample per step and, once
//! the buffer holds a full window, classifies the most recent window.
//! [`StreamSession::advance`] performs one step without any timing so the
//! state machine can be driven directly; [`StreamSession::run`] adds pacing,
//! retry delays and cancellation.

use crate::event::{DataPoint, PredictionEvent, StreamEvent};
use crate::source::{SegmentSource, SCENARIOS};
use crate::synthetic::SyntheticScenario;
use feature_engine::{FeatureExtractor, DEFAULT_SAMPLING_RATE, MIN_ANALYSIS_SAMPLES};
use inference_engine::{InferenceEngine, InferenceError};
use metrics::counter;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use ring_buffer::{SampleBuffer, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Streaming configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Pause after each emitted sample (default: 50ms, 20 Hz)
    pub tick_interval_ms: u64,
    /// Samples per classification window
    pub window_len: usize,
    /// Sample buffer capacity
    pub buffer_capacity: usize,
    /// Sampling rate assumed for windows (Hz)
    pub sampling_rate: u32,
    /// Samples streamed per recorded scenario
    pub real_points: usize,
    /// Samples streamed per synthetic scenario
    pub synthetic_points: usize,
    /// Wait before retrying when no scenario is available
    pub retry_delay_ms: u64,
    /// Event channel capacity
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            window_len: MIN_ANALYSIS_SAMPLES,
            buffer_capacity: DEFAULT_CAPACITY,
            sampling_rate: DEFAULT_SAMPLING_RATE,
            real_points: 500,
            synthetic_points: 200,
            retry_delay_ms: 1000,
            channel_capacity: 256,
        }
    }
}

impl StreamConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Where session samples come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamMode {
    /// Replay recorded dataset segments
    #[default]
    Real,
    /// Synthesize noise and fault-like signals
    Random,
}

impl StreamMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamMode::Real => "real",
            StreamMode::Random => "random",
        }
    }

    /// Parse a query-string mode
    pub fn parse(mode: &str) -> Option<Self> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "real" => Some(StreamMode::Real),
            "random" => Some(StreamMode::Random),
            _ => None,
        }
    }
}

impl fmt::Display for StreamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one emitting step
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub data_point: DataPoint,
    pub prediction: Option<PredictionEvent>,
}

impl Tick {
    /// Events in publication order
    pub fn into_events(self) -> Vec<StreamEvent> {
        let mut events = vec![StreamEvent::DataPoint(self.data_point)];
        if let Some(prediction) = self.prediction {
            events.push(StreamEvent::Prediction(prediction));
        }
        events
    }
}

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub cycles: u64,
    pub ticks: u64,
    pub predictions: u64,
}

/// Stops a running session at its next suspension point
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

#[derive(Debug)]
enum SessionState {
    Idle,
    Emitting {
        scenario: String,
        samples: Vec<f64>,
        position: usize,
    },
}

/// One streaming inference session
pub struct StreamSession {
    mode: StreamMode,
    config: StreamConfig,
    source: Arc<dyn SegmentSource>,
    engine: Arc<InferenceEngine>,
    extractor: Option<FeatureExtractor>,
    buffer: SampleBuffer,
    rng: StdRng,
    state: SessionState,
    cycle: u64,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl StreamSession {
    /// Create a session; a seed makes scenario choice and synthesis reproducible
    pub fn new(
        mode: StreamMode,
        config: StreamConfig,
        source: Arc<dyn SegmentSource>,
        engine: Arc<InferenceEngine>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let extractor = engine.extractor().ok();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        Self {
            mode,
            buffer: SampleBuffer::new(config.buffer_capacity.max(config.window_len)),
            config,
            source,
            engine,
            extractor,
            rng,
            state: SessionState::Idle,
            cycle: 0,
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
        }
    }

    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            tx: Arc::clone(&self.cancel_tx),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SessionState::Idle)
    }

    /// Number of scenarios started so far
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Scenario currently being emitted
    pub fn scenario(&self) -> Option<&str> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Emitting { scenario, .. } => Some(scenario),
        }
    }

    /// Samples currently buffered
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Perform one step
    ///
    /// Returns `None` only when idle and no scenario could be selected.
    pub fn advance(&mut self, timestamp: f64) -> Option<Tick> {
        if self.is_idle() {
            let (scenario, samples) = self.select()?;
            self.cycle += 1;
            self.buffer.clear();
            info!(
                "Stream cycle {}: scenario {} ({} samples)",
                self.cycle,
                scenario,
                samples.len()
            );
            self.state = SessionState::Emitting {
                scenario,
                samples,
                position: 0,
            };
        }

        let (scenario, amplitude, exhausted) = match &mut self.state {
            SessionState::Emitting {
                scenario,
                samples,
                position,
            } => match samples.get(*position) {
                Some(&amplitude) => {
                    *position += 1;
                    (scenario.clone(), amplitude, *position >= samples.len())
                }
                None => {
                    self.state = SessionState::Idle;
                    return None;
                }
            },
            SessionState::Idle => return None,
        };

        self.buffer.push(amplitude);
        let prediction = if self.buffer.len() >= self.config.window_len {
            self.predict(&scenario)
        } else {
            None
        };

        if exhausted {
            debug!("Scenario {} exhausted after cycle {}", scenario, self.cycle);
            self.state = SessionState::Idle;
        }

        Some(Tick {
            data_point: DataPoint {
                timestamp,
                amplitude,
                scenario,
                cycle: self.cycle,
            },
            prediction,
        })
    }

    /// Select the next scenario and its samples
    fn select(&mut self) -> Option<(String, Vec<f64>)> {
        match self.mode {
            StreamMode::Real => {
                let mut order = SCENARIOS;
                order.shuffle(&mut self.rng);
                for scenario in order {
                    match self.source.segment(scenario) {
                        Ok(mut segment) => {
                            segment.truncate(self.config.real_points);
                            if !segment.is_empty() {
                                return Some((scenario.to_string(), segment));
                            }
                            debug!("Scenario {} yielded no samples to stream", scenario);
                        }
                        Err(e) => debug!("Skipping scenario: {}", e),
                    }
                }
                None
            }
            StreamMode::Random => {
                let scenario = SyntheticScenario::choose(&mut self.rng);
                let dt = self.config.tick_interval_ms as f64 / 1000.0;
                let samples = scenario.generate(&mut self.rng, self.config.synthetic_points, dt);
                if samples.is_empty() {
                    return None;
                }
                Some((scenario.as_str().to_string(), samples))
            }
        }
    }

    /// Classify the most recent window; failures are logged and skipped
    fn predict(&mut self, scenario: &str) -> Option<PredictionEvent> {
        let window = self.buffer.read_last(self.config.window_len);

        let outcome = match self.extractor.as_mut() {
            Some(extractor) => extractor
                .extract_samples(&window, self.config.sampling_rate)
                .map_err(InferenceError::from)
                .and_then(|features| {
                    self.engine
                        .predict_features(&features)
                        .map(|result| (features, result))
                }),
            None => Err(InferenceError::ModelNotLoaded),
        };

        match outcome {
            Ok((features, result)) => {
                counter!("bearing_predictions_total", "outcome" => "ok", "source" => "stream")
                    .increment(1);
                Some(PredictionEvent {
                    prediction: result.label,
                    confidence: result.confidence,
                    probabilities: result.probabilities,
                    features,
                    scenario: scenario.to_string(),
                    cycle: self.cycle,
                })
            }
            Err(e) => {
                counter!("bearing_predictions_total", "outcome" => "error", "source" => "stream")
                    .increment(1);
                warn!("Stream prediction failed (cycle {}): {}", self.cycle, e);
                None
            }
        }
    }

    /// Drive the session until cancelled or the consumer disconnects
    pub async fn run(mut self, tx: mpsc::Sender<StreamEvent>) -> SessionStats {
        info!("Starting stream session in {} mode", self.mode);
        counter!("bearing_stream_sessions_total", "mode" => self.mode.as_str()).increment(1);

        let mut cancelled = self.cancel_rx.clone();
        let mut stats = SessionStats::default();

        'session: loop {
            if *cancelled.borrow() {
                info!("Stream session cancelled");
                break;
            }

            let delay = match self.advance(unix_now()) {
                Some(tick) => {
                    stats.ticks += 1;
                    counter!("bearing_stream_ticks_total").increment(1);
                    if tick.prediction.is_some() {
                        stats.predictions += 1;
                    }
                    for event in tick.into_events() {
                        if tx.send(event).await.is_err() {
                            info!("Stream consumer disconnected");
                            break 'session;
                        }
                    }
                    self.config.tick_interval()
                }
                None => {
                    warn!(
                        "No scenario available, retrying in {}ms",
                        self.config.retry_delay_ms
                    );
                    self.config.retry_delay()
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = tx.closed() => {
                    info!("Stream consumer disconnected");
                    break;
                }
                Ok(()) = cancelled.changed() => {}
            }
        }

        stats.cycles = self.cycle;
        info!(
            "Stream session ended: {} cycles, {} ticks, {} predictions",
            stats.cycles, stats.ticks, stats.predictions
        );
        stats
    }
}

fn unix_now() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
