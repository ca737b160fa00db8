//! Configuration structures for LogTee

use crate::{LogTeeError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_logging_level() -> String {
    "INFO".to_string()
}

fn default_file_size_mb() -> u64 {
    500
}

fn default_backups() -> usize {
    10
}

fn default_retention_days() -> u32 {
    7
}

fn default_queue_capacity() -> usize {
    1024
}

/// Logger configuration
///
/// Field names match the configuration keys exposed to deployment tooling, so
/// the struct deserializes directly from a host application's config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Path of the log file. An empty string disables the file sink and logs
    /// go to the console only.
    #[serde(default)]
    pub log_file_name: String,
    /// Minimum severity emitted, one of INFO, WARN, ERROR, DPANIC, PANIC,
    /// FATAL, DEBUG. Unrecognized values fall back to INFO.
    #[serde(default = "default_logging_level")]
    pub logging_level: String,
    /// Maximum log file size in megabytes before rotation
    #[serde(default = "default_file_size_mb")]
    pub log_file_size_capping_in_mbs: u64,
    /// Number of rotated backup files retained (0 keeps all)
    #[serde(default = "default_backups")]
    pub max_log_backups_count: usize,
    /// Maximum age of rotated files in days (0 disables age pruning)
    #[serde(default = "default_retention_days")]
    pub max_old_log_retention_in_days: u32,
    /// Whether rotated files are gzip-compressed
    #[serde(default)]
    pub logs_compression_required: bool,
    /// Capacity of the writer's record queue
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            log_file_name: String::new(),
            logging_level: default_logging_level(),
            log_file_size_capping_in_mbs: default_file_size_mb(),
            max_log_backups_count: default_backups(),
            max_old_log_retention_in_days: default_retention_days(),
            logs_compression_required: false,
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl LoggerSettings {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LogTeeError::Config(format!("Failed to read config file: {}", e)))?;

        let settings: LoggerSettings = toml::from_str(&content)
            .map_err(|e| LogTeeError::Config(format!("Failed to parse config: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LogTeeError::Config(
                "Queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
