//! # LogTee - Buffered Dual-Sink Structured Logging
//!
//! LogTee is a structured JSON logger that decouples log I/O from the calling
//! task: encoded records are pushed onto a bounded queue and a single
//! background worker fans each record out to the console and, optionally, a
//! size-rotated log file.
//!
//! ## Features
//!
//! - **Dual Sinks**: every record goes to standard output, and to a rotating
//!   file when a path is configured
//! - **Bounded Buffering**: a fixed-capacity queue absorbs bursts; producers
//!   only wait when the queue is full
//! - **Log Rotation**: size-capped files with timestamped backups, count and
//!   age pruning, optional gzip compression
//! - **Structured Records**: JSON with `message`, `level`, `time`, `caller`
//!   and arbitrary attached fields
//! - **Graceful Shutdown**: `shutdown()` drains every buffered record before
//!   returning
//!
//! ## Quick Start
//!
//! ```no_run
//! use logtee::config::LoggerSettings;
//! use logtee::logger::Logger;
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = LoggerSettings {
//!         log_file_name: "logs/app.log".to_string(),
//!         logging_level: "DEBUG".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let logger = Logger::init(&settings).await;
//!
//!     logger.info("service started").await;
//!     logger.warn(format!("cache miss rate {:.1}%", 12.5)).await;
//!
//!     logger.shutdown().await;
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod logger;
pub mod sink;
pub mod types;

/// Common error types used throughout LogTee
pub mod error {
    use std::fmt;

    /// LogTee error types
    #[derive(Debug)]
    pub enum LogTeeError {
        /// I/O operation failed
        Io(std::io::Error),
        /// Serialization/deserialization failed
        Serde(serde_json::Error),
        /// Configuration error
        Config(String),
        /// Sink construction or rotation error
        Sink(String),
    }

    impl fmt::Display for LogTeeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                LogTeeError::Io(e) => write!(f, "I/O error: {}", e),
                LogTeeError::Serde(e) => write!(f, "Serialization error: {}", e),
                LogTeeError::Config(e) => write!(f, "Configuration error: {}", e),
                LogTeeError::Sink(e) => write!(f, "Sink error: {}", e),
            }
        }
    }

    impl std::error::Error for LogTeeError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                LogTeeError::Io(e) => Some(e),
                LogTeeError::Serde(e) => Some(e),
                _ => None,
            }
        }
    }

    impl From<std::io::Error> for LogTeeError {
        fn from(err: std::io::Error) -> Self {
            LogTeeError::Io(err)
        }
    }

    impl From<serde_json::Error> for LogTeeError {
        fn from(err: serde_json::Error) -> Self {
            LogTeeError::Serde(err)
        }
    }

    /// Result type alias for LogTee operations
    pub type Result<T> = std::result::Result<T, LogTeeError>;
}

pub use error::{LogTeeError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::LoggerSettings;
    pub use crate::logger::Logger;
    pub use crate::sink::{RotationPolicy, SinkStats, TeeWriter};
    pub use crate::types::{LogFields, Severity};
    pub use crate::{LogTeeError, Result};
}
