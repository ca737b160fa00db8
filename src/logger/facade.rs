//! Logger facade: binds configuration to the buffered dual-sink pipeline and
//! exposes the leveled logging API.

use crate::config::LoggerSettings;
use crate::sink::{RotatingFileSink, RotationPolicy, SinkStats, TeeWriter};
use crate::types::{LogFields, Record, Severity};
use crate::Result;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use tokio::io::AsyncWrite;

/// Field attached to records emitted through the plain error path
const RESPONSE_MESSAGE_KEY: &str = "response_message";

/// Handle to a configured logging pipeline.
///
/// Cloning is cheap (the pipeline is shared behind an `Arc`); construct the
/// logger once at startup and hand clones to every component that logs.
///
/// Leveled methods return a future so the caller decides where to await; the
/// call site location is captured synchronously, which keeps the `caller`
/// field pointing at the invoking code rather than at this facade.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerCore>,
}

struct LoggerCore {
    min_level: Severity,
    tee: TeeWriter,
}

impl Logger {
    /// Build a logger from settings, falling back to a console-only logger
    /// if construction fails.
    ///
    /// The construction failure itself is reported through the fallback
    /// logger, so startup problems remain visible in the log output.
    pub async fn init(settings: &LoggerSettings) -> Self {
        match Self::try_init(settings).await {
            Ok(logger) => logger,
            Err(e) => {
                // The degraded logger ignores the configured level so the
                // construction failure cannot be filtered out of the output.
                let fallback_settings = LoggerSettings {
                    log_file_name: String::new(),
                    logging_level: "DEBUG".to_string(),
                    queue_capacity: settings.queue_capacity.max(1),
                    ..settings.clone()
                };
                let tee = TeeWriter::new(fallback_settings.queue_capacity, None);
                let fallback = Self::from_parts(&fallback_settings, tee);
                fallback
                    .error_with_cause(
                        "Was unable to create the configured logger, continuing with console output only!",
                        &e,
                    )
                    .await;
                fallback
            }
        }
    }

    /// Build a logger from settings.
    ///
    /// When `log_file_name` is blank the file sink is skipped and records go
    /// to the console only.
    pub async fn try_init(settings: &LoggerSettings) -> Result<Self> {
        settings.validate()?;
        let file = Self::open_file_sink(settings).await?;
        let tee = TeeWriter::new(settings.queue_capacity, file);
        Ok(Self::from_parts(settings, tee))
    }

    /// Build a logger writing console output to `console` instead of the
    /// process standard output. Useful for tests and embedders capturing
    /// output.
    pub async fn try_with_console<W>(settings: &LoggerSettings, console: W) -> Result<Self>
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        settings.validate()?;
        let file = Self::open_file_sink(settings).await?;
        let tee = TeeWriter::with_console(settings.queue_capacity, console, file);
        Ok(Self::from_parts(settings, tee))
    }

    async fn open_file_sink(settings: &LoggerSettings) -> Result<Option<RotatingFileSink>> {
        if settings.log_file_name.trim().is_empty() {
            return Ok(None);
        }
        let sink = RotatingFileSink::open(RotationPolicy::from(settings)).await?;
        Ok(Some(sink))
    }

    fn from_parts(settings: &LoggerSettings, tee: TeeWriter) -> Self {
        Self {
            inner: Arc::new(LoggerCore {
                min_level: Severity::parse(&settings.logging_level),
                tee,
            }),
        }
    }

    /// The minimum severity this logger emits
    pub fn level(&self) -> Severity {
        self.inner.min_level
    }

    /// Fault counters for the underlying writer
    pub fn stats(&self) -> &SinkStats {
        self.inner.tee.stats()
    }

    /// Wait until everything logged before this call has reached the sinks
    pub async fn flush(&self) {
        self.inner.tee.flush().await;
    }

    /// Drain all buffered records and stop the background worker.
    ///
    /// Call during graceful shutdown; records logged afterwards are counted
    /// as dropped. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.inner.tee.shutdown().await;
    }

    fn enabled(&self, level: Severity) -> bool {
        level >= self.inner.min_level
    }

    #[track_caller]
    fn log<'a>(
        &'a self,
        level: Severity,
        message: String,
        fields: LogFields,
    ) -> impl Future<Output = ()> + Send + 'a {
        let record = if self.enabled(level) {
            Some(Record::with_fields(level, message, fields))
        } else {
            None
        };
        async move {
            if let Some(record) = record {
                match record.to_json() {
                    Ok(mut line) => {
                        line.push('\n');
                        self.inner.tee.write(Bytes::from(line)).await;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to encode log record");
                    }
                }
            }
        }
    }

    /// Log a debug message
    #[track_caller]
    pub fn debug<'a>(&'a self, message: impl Into<String>) -> impl Future<Output = ()> + Send + 'a {
        self.log(Severity::Debug, message.into(), LogFields::new())
    }

    /// Log a debug message with fields
    #[track_caller]
    pub fn debug_with_fields<'a>(
        &'a self,
        message: impl Into<String>,
        fields: LogFields,
    ) -> impl Future<Output = ()> + Send + 'a {
        self.log(Severity::Debug, message.into(), fields)
    }

    /// Log an info message
    #[track_caller]
    pub fn info<'a>(&'a self, message: impl Into<String>) -> impl Future<Output = ()> + Send + 'a {
        self.log(Severity::Info, message.into(), LogFields::new())
    }

    /// Log an info message with fields
    #[track_caller]
    pub fn info_with_fields<'a>(
        &'a self,
        message: impl Into<String>,
        fields: LogFields,
    ) -> impl Future<Output = ()> + Send + 'a {
        self.log(Severity::Info, message.into(), fields)
    }

    /// Log a warning message
    #[track_caller]
    pub fn warn<'a>(&'a self, message: impl Into<String>) -> impl Future<Output = ()> + Send + 'a {
        self.log(Severity::Warn, message.into(), LogFields::new())
    }

    /// Log a warning message with fields
    #[track_caller]
    pub fn warn_with_fields<'a>(
        &'a self,
        message: impl Into<String>,
        fields: LogFields,
    ) -> impl Future<Output = ()> + Send + 'a {
        self.log(Severity::Warn, message.into(), fields)
    }

    /// Log an error message.
    ///
    /// The emitted record carries a `response_message` field of `"unknown"`;
    /// use [`error_with_cause`](Logger::error_with_cause) when a source error
    /// is available.
    #[track_caller]
    pub fn error<'a>(&'a self, message: impl Into<String>) -> impl Future<Output = ()> + Send + 'a {
        let mut fields = LogFields::new();
        fields.insert(RESPONSE_MESSAGE_KEY.to_string(), "unknown".to_string());
        self.log(Severity::Error, message.into(), fields)
    }

    /// Log an error message caused by `cause`.
    ///
    /// The cause's display text is appended to the message and also attached
    /// as the `response_message` field on the record.
    #[track_caller]
    pub fn error_with_cause<'a>(
        &'a self,
        message: impl Into<String>,
        cause: &(impl std::error::Error + ?Sized),
    ) -> impl Future<Output = ()> + Send + 'a {
        let cause_text = cause.to_string();
        let mut fields = LogFields::new();
        fields.insert(RESPONSE_MESSAGE_KEY.to_string(), cause_text.clone());
        self.log(
            Severity::Error,
            format!("{} {}", message.into(), cause_text),
            fields,
        )
    }

    /// Log an error message with fields, without `response_message`
    /// enrichment
    #[track_caller]
    pub fn error_with_fields<'a>(
        &'a self,
        message: impl Into<String>,
        fields: LogFields,
    ) -> impl Future<Output = ()> + Send + 'a {
        self.log(Severity::Error, message.into(), fields)
    }

    /// Log a fatal message.
    ///
    /// Unlike loggers that abort the process at this level, the record is
    /// emitted and control returns to the caller; exiting is the caller's
    /// decision.
    #[track_caller]
    pub fn fatal<'a>(&'a self, message: impl Into<String>) -> impl Future<Output = ()> + Send + 'a {
        self.log(Severity::Fatal, message.into(), LogFields::new())
    }

    /// Log a fatal message with fields
    #[track_caller]
    pub fn fatal_with_fields<'a>(
        &'a self,
        message: impl Into<String>,
        fields: LogFields,
    ) -> impl Future<Output = ()> + Send + 'a {
        self.log(Severity::Fatal, message.into(), fields)
    }
}
