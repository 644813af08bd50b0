//! Signal Validator

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum number of samples required for feature extraction
pub const MIN_ANALYSIS_SAMPLES: usize = 100;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum signal length (samples)
    pub min_samples: usize,
    /// Maximum signal length (samples)
    pub max_samples: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_samples: MIN_ANALYSIS_SAMPLES,
            max_samples: 120_000,
        }
    }
}

/// Validator for raw vibration signals
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate signal length against the configured bounds
    pub fn validate_length(&self, len: usize) -> Result<(), ValidationError> {
        if len < self.config.min_samples {
            return Err(ValidationError::TooShort {
                actual: len,
                min: self.config.min_samples,
            });
        }
        if len > self.config.max_samples {
            return Err(ValidationError::TooLong {
                actual: len,
                max: self.config.max_samples,
            });
        }
        Ok(())
    }

    /// Validate the sampling rate
    pub fn validate_sampling_rate(&self, sampling_rate: u32) -> Result<(), ValidationError> {
        if sampling_rate == 0 {
            Err(ValidationError::InvalidSamplingRate(sampling_rate))
        } else {
            Ok(())
        }
    }

    /// Reject NaN and infinite samples
    pub fn validate_finite(&self, samples: &[f64]) -> Result<(), ValidationError> {
        match samples.iter().position(|s| !s.is_finite()) {
            Some(index) => Err(ValidationError::NonFiniteSample { index }),
            None => Ok(()),
        }
    }

    /// Run every check on a signal
    pub fn validate(&self, samples: &[f64], sampling_rate: u32) -> Result<(), ValidationError> {
        self.validate_sampling_rate(sampling_rate)?;
        self.validate_length(samples.len())?;
        self.validate_finite(samples)?;
        debug!("Signal validated: {} samples @ {} Hz", samples.len(), sampling_rate);
        Ok(())
    }

    /// Get the active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimum_length() {
        let validator = Validator::default();
        assert!(validator.validate(&vec![0.0; 100], 12_000).is_ok());
        assert_eq!(
            validator.validate(&vec![0.0; 99], 12_000),
            Err(ValidationError::TooShort { actual: 99, min: 100 })
        );
    }

    #[test]
    fn test_maximum_length() {
        let validator = Validator::new(ValidationConfig {
            min_samples: 100,
            max_samples: 200,
        });
        assert!(validator.validate_length(200).is_ok());
        assert!(matches!(
            validator.validate_length(201),
            Err(ValidationError::TooLong { actual: 201, max: 200 })
        ));
    }

    #[test]
    fn test_non_finite_sample() {
        let validator = Validator::default();
        let mut samples = vec![0.5; 150];
        samples[42] = f64::NAN;
        assert_eq!(
            validator.validate(&samples, 12_000),
            Err(ValidationError::NonFiniteSample { index: 42 })
        );

        samples[42] = f64::INFINITY;
        assert!(validator.validate(&samples, 12_000).is_err());
    }

    #[test]
    fn test_zero_sampling_rate() {
        let validator = Validator::default();
        assert_eq!(
            validator.validate(&vec![0.0; 100], 0),
            Err(ValidationError::InvalidSamplingRate(0))
        );
    }

    #[test]
    fn test_error_message_is_readable() {
        let err = ValidationError::TooShort { actual: 10, min: 100 };
        assert_eq!(err.to_string(), "Signal too short: 10 samples (minimum 100 samples)");
    }
}
