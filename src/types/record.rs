//! Structured log records

use crate::types::Severity;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::panic::Location;

/// Type alias for attached record fields
pub type LogFields = HashMap<String, String>;

/// A fully-described log record, ready for encoding
///
/// The `caller` field points at the code that invoked the logging facade, not
/// at the facade itself; every constructor is `#[track_caller]` so the
/// location is resolved one frame up at compile time.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// Primary log message
    pub message: String,
    /// Record severity, serialized capitalized
    pub level: Severity,
    /// ISO-8601 timestamp with millisecond precision (UTC)
    pub time: String,
    /// Source location of the logging call, as `file:line`
    pub caller: String,
    /// Additional structured fields, flattened into the record
    #[serde(flatten)]
    pub fields: LogFields,
}

impl Record {
    /// Create a record with no attached fields
    #[track_caller]
    pub fn new(level: Severity, message: String) -> Self {
        Self::with_fields(level, message, LogFields::new())
    }

    /// Create a record carrying attached fields
    #[track_caller]
    pub fn with_fields(level: Severity, message: String, fields: LogFields) -> Self {
        let caller = Location::caller();
        Self {
            message,
            level,
            time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            caller: format!("{}:{}", caller.file(), caller.line()),
            fields,
        }
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
