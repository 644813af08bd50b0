//! Streaming Inference
//!
//! Simulates continuous bearing monitoring: a session replays recorded fault
//! segments or synthesizes noise, feeds samples one at a time into a bounded
//! buffer and re-classifies the most recent window on every tick.

mod event;
mod session;
mod source;
mod synthetic;

pub use event::{DataPoint, PredictionEvent, StreamEvent};
pub use session::{CancelHandle, SessionStats, StreamConfig, StreamMode, StreamSession, Tick};
pub use source::{
    DirectorySource, MemorySource, SegmentSource, SourceError, SCENARIOS, SEGMENT_LEN,
    SEGMENT_OFFSET,
};
pub use synthetic::SyntheticScenario;
