//! Log severity levels

use serde::{Deserialize, Serialize};
use std::fmt;

/// Log severity, ordered from least to most severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Debug: fine-grained diagnostic output
    Debug,
    /// Info: normal operational messages
    Info,
    /// Warn: something unexpected, the process continues
    Warn,
    /// Error: an operation failed
    Error,
    /// Dpanic: an invariant was violated that would panic in development
    Dpanic,
    /// Panic: an unrecoverable fault
    Panic,
    /// Fatal: the process cannot continue
    Fatal,
}

impl Severity {
    /// Resolve a severity from its configuration name.
    ///
    /// Recognizes INFO, WARN, ERROR, DPANIC, PANIC, FATAL and DEBUG; any
    /// other input resolves to [`Severity::Info`].
    pub fn parse(name: &str) -> Self {
        match name {
            "INFO" => Severity::Info,
            "WARN" => Severity::Warn,
            "ERROR" => Severity::Error,
            "DPANIC" => Severity::Dpanic,
            "PANIC" => Severity::Panic,
            "FATAL" => Severity::Fatal,
            "DEBUG" => Severity::Debug,
            _ => Severity::Info,
        }
    }

    /// The capitalized name used on emitted records
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Dpanic => "DPANIC",
            Severity::Panic => "PANIC",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
