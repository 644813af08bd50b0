//! Diagnostic Report Assembly
//!
//! Aggregates a signal, its features and the classifier verdict into an
//! immutable bundle for an external renderer, with health status and severity
//! ranking derived from the predicted class.

mod bundle;

pub use bundle::{HealthStatus, RankedClass, RankedProbability, ReportBundle};
