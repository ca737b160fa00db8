//! Core record and severity types

pub mod level;
pub mod record;

pub use level::Severity;
pub use record::{LogFields, Record};
