//! Recorded segment sources

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Scenario keys of the recorded dataset
pub const SCENARIOS: [&str; 4] = ["normal", "fault/ball", "fault/inner_race", "fault/outer_race"];

/// Samples per recorded segment
pub const SEGMENT_LEN: usize = 2400;

/// Offset of the segment inside a recording
pub const SEGMENT_OFFSET: usize = 10_000;

/// Errors from segment sources
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("Scenario '{scenario}' unavailable: {reason}")]
    Unavailable { scenario: String, reason: String },
}

impl SourceError {
    fn unavailable(scenario: &str, reason: impl Into<String>) -> Self {
        SourceError::Unavailable {
            scenario: scenario.to_string(),
            reason: reason.into(),
        }
    }
}

/// Provides a fixed-length recorded segment for a scenario key
pub trait SegmentSource: Send + Sync {
    fn segment(&self, scenario: &str) -> Result<Vec<f64>, SourceError>;
}

/// Cut the analysis segment out of a full recording
fn cut_segment(scenario: &str, recording: &[f64]) -> Result<Vec<f64>, SourceError> {
    if recording.len() >= SEGMENT_OFFSET + SEGMENT_LEN {
        Ok(recording[SEGMENT_OFFSET..SEGMENT_OFFSET + SEGMENT_LEN].to_vec())
    } else if recording.len() >= SEGMENT_LEN {
        debug!("Recording for {} shorter than offset, using its start", scenario);
        Ok(recording[..SEGMENT_LEN].to_vec())
    } else {
        Err(SourceError::unavailable(
            scenario,
            format!("recording has {} samples, need {}", recording.len(), SEGMENT_LEN),
        ))
    }
}

/// In-memory recordings keyed by scenario
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    recordings: HashMap<String, Vec<f64>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a full recording for a scenario
    pub fn with_recording(mut self, scenario: impl Into<String>, recording: Vec<f64>) -> Self {
        self.recordings.insert(scenario.into(), recording);
        self
    }
}

impl SegmentSource for MemorySource {
    fn segment(&self, scenario: &str) -> Result<Vec<f64>, SourceError> {
        let recording = self
            .recordings
            .get(scenario)
            .ok_or_else(|| SourceError::unavailable(scenario, "no recording"))?;
        cut_segment(scenario, recording)
    }
}

/// Recordings stored as JSON sample arrays in a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Recording file for a scenario key
    fn file_name(scenario: &str) -> Option<&'static str> {
        match scenario {
            "normal" => Some("normal_0.json"),
            "fault/ball" => Some("ball_007_0.json"),
            "fault/inner_race" => Some("inner_007_0.json"),
            "fault/outer_race" => Some("outer_007_0.json"),
            _ => None,
        }
    }
}

impl SegmentSource for DirectorySource {
    fn segment(&self, scenario: &str) -> Result<Vec<f64>, SourceError> {
        let file = Self::file_name(scenario)
            .ok_or_else(|| SourceError::unavailable(scenario, "unknown scenario"))?;
        let path = self.root.join(file);

        let raw = std::fs::read_to_string(&path).map_err(|e| {
            warn!("Failed to read {}: {}", path.display(), e);
            SourceError::unavailable(scenario, format!("{}: {}", path.display(), e))
        })?;
        let recording: Vec<f64> = serde_json::from_str(&raw).map_err(|e| {
            SourceError::unavailable(scenario, format!("{}: {}", path.display(), e))
        })?;

        if recording.iter().any(|v| !v.is_finite()) {
            return Err(SourceError::unavailable(scenario, "recording contains non-finite samples"));
        }
        cut_segment(scenario, &recording)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| i as f64).collect()
    }

    #[test]
    fn test_segment_from_offset() {
        let source = MemorySource::new().with_recording("normal", ramp(20_000));
        let segment = source.segment("normal").unwrap();
        assert_eq!(segment.len(), SEGMENT_LEN);
        assert_eq!(segment[0], SEGMENT_OFFSET as f64);
    }

    #[test]
    fn test_short_recording_uses_start() {
        let source = MemorySource::new().with_recording("fault/ball", ramp(5000));
        let segment = source.segment("fault/ball").unwrap();
        assert_eq!(segment.len(), SEGMENT_LEN);
        assert_eq!(segment[0], 0.0);
    }

    #[test]
    fn test_too_short_recording_unavailable() {
        let source = MemorySource::new().with_recording("normal", ramp(100));
        assert!(matches!(source.segment("normal"), Err(SourceError::Unavailable { .. })));
        assert!(matches!(source.segment("fault/ball"), Err(SourceError::Unavailable { .. })));
    }

    #[test]
    fn test_directory_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("inner_007_0.json"),
            serde_json::to_string(&ramp(12_500)).unwrap(),
        )
        .unwrap();
        std::fs::write(dir.path().join("outer_007_0.json"), "not json").unwrap();

        let source = DirectorySource::new(dir.path());
        let segment = source.segment("fault/inner_race").unwrap();
        assert_eq!(segment[0], 10_000.0);
        assert_eq!(segment.len(), SEGMENT_LEN);

        assert!(source.segment("fault/outer_race").is_err());
        assert!(source.segment("normal").is_err());
        assert!(source.segment("fault/cage").is_err());
    }
}
