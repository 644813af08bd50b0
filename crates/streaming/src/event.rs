//! Stream events

use feature_engine::FeatureMap;
use inference_engine::FaultClass;
use serde::Serialize;
use std::collections::BTreeMap;

/// One emitted sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataPoint {
    /// Unix time in seconds
    pub timestamp: f64,
    pub amplitude: f64,
    pub scenario: String,
    /// Scenario switch counter, starting at 1
    pub cycle: u64,
}

/// Classification of the most recent window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionEvent {
    pub prediction: FaultClass,
    pub confidence: f64,
    pub probabilities: BTreeMap<FaultClass, f64>,
    pub features: FeatureMap,
    pub scenario: String,
    pub cycle: u64,
}

/// Event published by a stream session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    DataPoint(DataPoint),
    Prediction(PredictionEvent),
}

impl StreamEvent {
    /// SSE event name; data points use the default `message` event
    pub fn event_name(&self) -> Option<&'static str> {
        match self {
            StreamEvent::DataPoint(_) => None,
            StreamEvent::Prediction(_) => Some("prediction"),
        }
    }

    pub fn cycle(&self) -> u64 {
        match self {
            StreamEvent::DataPoint(p) => p.cycle,
            StreamEvent::Prediction(p) => p.cycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_point_json() {
        let event = StreamEvent::DataPoint(DataPoint {
            timestamp: 1.5,
            amplitude: -0.25,
            scenario: "normal".to_string(),
            cycle: 3,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "data_point");
        assert_eq!(json["amplitude"], -0.25);
        assert_eq!(json["cycle"], 3);
        assert_eq!(event.event_name(), None);
    }
}
