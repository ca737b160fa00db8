//! Minimal LogTee usage: console + rotating file, graceful shutdown.
//!
//! Run with `cargo run --example basic_usage`; records land on stdout and in
//! `logs/demo.log`.

use logtee::config::LoggerSettings;
use logtee::logger::Logger;
use logtee::types::LogFields;

#[tokio::main]
async fn main() {
    // Internal pipeline diagnostics (rotation faults etc.) are tracing
    // events; install a subscriber to see them
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("logtee=debug")),
        )
        .init();

    let settings = LoggerSettings {
        log_file_name: "logs/demo.log".to_string(),
        logging_level: "DEBUG".to_string(),
        log_file_size_capping_in_mbs: 10,
        max_log_backups_count: 3,
        max_old_log_retention_in_days: 7,
        logs_compression_required: true,
        ..Default::default()
    };

    let logger = Logger::init(&settings).await;

    logger.info("demo started").await;
    logger.debug(format!("pid {}", std::process::id())).await;

    let mut fields = LogFields::new();
    fields.insert("component".to_string(), "demo".to_string());
    fields.insert("attempt".to_string(), "1".to_string());
    logger.info_with_fields("structured hello", fields).await;

    let err = std::io::Error::other("downstream unavailable");
    logger.error_with_cause("request failed", &err).await;

    logger.shutdown().await;
}
