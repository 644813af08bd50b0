//! Raw vibration signal

use serde::{Deserialize, Serialize};

/// Sampling rate of the reference bearing dataset (Hz)
pub const DEFAULT_SAMPLING_RATE: u32 = 12_000;

/// Ordered amplitude samples paired with their sampling rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    samples: Vec<f64>,
    sampling_rate: u32,
}

impl Signal {
    /// Create a signal. Validation happens at extraction time.
    pub fn new(samples: Vec<f64>, sampling_rate: u32) -> Self {
        Self {
            samples,
            sampling_rate,
        }
    }

    /// Raw samples
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sampling rate (Hz)
    pub fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the signal has no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Signal duration in seconds (0 for an invalid sampling rate)
    pub fn duration_seconds(&self) -> f64 {
        if self.sampling_rate == 0 {
            0.0
        } else {
            self.samples.len() as f64 / self.sampling_rate as f64
        }
    }

    /// Consume the signal, returning its samples
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}
