//! Feature Engineering Engine
//!
//! Turns a raw vibration signal into named time and frequency domain features
//! and projects them into the ordered vector a trained classifier expects.

mod error;
mod features;
mod fft;
mod numeric;
mod order;
mod signal;
mod statistics;
mod strategy;

pub use data_validator::{ValidationConfig, ValidationError, Validator, MIN_ANALYSIS_SAMPLES};
pub use error::SchemaError;
pub use features::{names, FeatureExtractor, FeatureMap};
pub use fft::{FftAnalyzer, PowerSpectrum, Spectrum};
pub use numeric::{finite_or, safe_ratio};
pub use order::{FeatureOrder, FeatureVector};
pub use signal::{Signal, DEFAULT_SAMPLING_RATE};
pub use statistics::TimeDomainFeatures;
pub use strategy::{DirectFft, FrequencyFeatureStrategy, StrategyKind, WelchPsd};
