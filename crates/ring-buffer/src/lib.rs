//! Sample Ring Buffer
//!
//! Provides a bounded, pre-allocated ring of the most recent signal samples.

mod buffer;

pub use buffer::{SampleBuffer, DEFAULT_CAPACITY};
