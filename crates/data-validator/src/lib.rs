//! Signal Validation
//!
//! Checks raw vibration signals before they reach feature extraction.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, Validator, MIN_ANALYSIS_SAMPLES};
