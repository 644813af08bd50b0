//! Validation Error Types

use thiserror::Error;

/// Errors raised when a signal cannot be analyzed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Fewer samples than the analysis window requires
    #[error("Signal too short: {actual} samples (minimum {min} samples)")]
    TooShort { actual: usize, min: usize },

    /// More samples than a single request may carry
    #[error("Signal too long: {actual} samples (maximum {max} samples)")]
    TooLong { actual: usize, max: usize },

    /// NaN or infinite sample
    #[error("Sample {index} is not a finite number")]
    NonFiniteSample { index: usize },

    /// Sampling rate must be a positive number of Hz
    #[error("Invalid sampling rate: {0} Hz")]
    InvalidSamplingRate(u32),
}
