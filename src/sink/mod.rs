//! Output sinks: the buffered tee writer and the rotating file sink

pub mod rotation;
pub mod tee;

pub use rotation::{RotatingFileSink, RotationPolicy};
pub use tee::{SinkStats, TeeWriter};
