//! Integration tests for the LogTee logging facade

use chrono::DateTime;
use logtee::config::LoggerSettings;
use logtee::logger::Logger;
use logtee::types::{LogFields, Severity};
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, DuplexStream};
use tokio::time::{timeout, Duration};

/// Build a logger whose console sink is a capturable in-memory pipe
async fn console_logger(settings: &LoggerSettings) -> (Logger, DuplexStream) {
    let (console, peer) = tokio::io::duplex(64 * 1024);
    let logger = Logger::try_with_console(settings, console).await.unwrap();
    (logger, peer)
}

/// Read console output until `expected` JSON lines have arrived
async fn read_records(peer: &mut DuplexStream, expected: usize) -> Vec<serde_json::Value> {
    let mut collected = Vec::new();
    while collected.iter().filter(|b| **b == b'\n').count() < expected {
        let mut buf = vec![0u8; 8192];
        let n = timeout(Duration::from_secs(2), peer.read(&mut buf))
            .await
            .expect("timed out waiting for log output")
            .unwrap();
        if n == 0 {
            break;
        }
        collected.extend_from_slice(&buf[..n]);
    }
    String::from_utf8(collected)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_console_only_end_to_end() {
    let temp_dir = tempdir().unwrap();
    let settings = LoggerSettings {
        log_file_name: String::new(),
        ..Default::default()
    };
    let (logger, mut peer) = console_logger(&settings).await;

    logger.info("hello").await;
    logger.flush().await;

    let records = read_records(&mut peer, 1).await;
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record["message"], "hello");
    assert_eq!(record["level"], "INFO");
    assert!(DateTime::parse_from_rfc3339(record["time"].as_str().unwrap()).is_ok());
    assert!(record["caller"].as_str().unwrap().contains("logger_tests.rs"));

    logger.shutdown().await;

    // No file sink was configured, so nothing was written to disk
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_error_with_cause_attaches_response_message() {
    let (logger, mut peer) = console_logger(&LoggerSettings::default()).await;

    let cause = std::io::Error::other("boom");
    logger.error_with_cause("request failed", &cause).await;
    logger.flush().await;

    let records = read_records(&mut peer, 1).await;
    let record = &records[0];
    assert_eq!(record["response_message"], "boom");
    assert_eq!(record["message"], "request failed boom");
    assert_eq!(record["level"], "ERROR");

    logger.shutdown().await;
}

#[tokio::test]
async fn test_plain_error_defaults_response_message_to_unknown() {
    let (logger, mut peer) = console_logger(&LoggerSettings::default()).await;

    logger.error("something went wrong").await;
    logger.flush().await;

    let records = read_records(&mut peer, 1).await;
    assert_eq!(records[0]["response_message"], "unknown");
    assert_eq!(records[0]["message"], "something went wrong");

    logger.shutdown().await;
}

#[tokio::test]
async fn test_error_with_fields_is_not_enriched() {
    let (logger, mut peer) = console_logger(&LoggerSettings::default()).await;

    let mut fields = LogFields::new();
    fields.insert("request_id".to_string(), "req-7".to_string());
    logger.error_with_fields("lookup failed", fields).await;
    logger.flush().await;

    let records = read_records(&mut peer, 1).await;
    assert_eq!(records[0]["request_id"], "req-7");
    assert!(records[0].get("response_message").is_none());

    logger.shutdown().await;
}

#[tokio::test]
async fn test_records_reach_console_and_file() {
    let temp_dir = tempdir().unwrap();
    let file_path = temp_dir.path().join("app.log");
    let settings = LoggerSettings {
        log_file_name: file_path.to_string_lossy().to_string(),
        ..Default::default()
    };
    let (logger, mut peer) = console_logger(&settings).await;

    logger.info("to both sinks").await;
    logger.shutdown().await;

    let console_records = read_records(&mut peer, 1).await;
    assert_eq!(console_records[0]["message"], "to both sinks");

    let file_content = std::fs::read_to_string(&file_path).unwrap();
    let file_record: serde_json::Value =
        serde_json::from_str(file_content.lines().next().unwrap()).unwrap();
    assert_eq!(file_record, console_records[0]);
}

#[tokio::test]
async fn test_all_levels_emit_capitalized_names() {
    let settings = LoggerSettings {
        logging_level: "DEBUG".to_string(),
        ..Default::default()
    };
    let (logger, mut peer) = console_logger(&settings).await;

    logger.debug("d").await;
    logger.info("i").await;
    logger.warn("w").await;
    logger.error("e").await;
    logger.fatal("f").await;
    logger.flush().await;

    let records = read_records(&mut peer, 5).await;
    let levels: Vec<&str> = records
        .iter()
        .map(|r| r["level"].as_str().unwrap())
        .collect();
    assert_eq!(levels, vec!["DEBUG", "INFO", "WARN", "ERROR", "FATAL"]);

    logger.shutdown().await;
}

#[tokio::test]
async fn test_fatal_returns_to_caller() {
    let (logger, mut peer) = console_logger(&LoggerSettings::default()).await;

    logger.fatal("unrecoverable state").await;
    logger.flush().await;

    // Still running: the facade emits the record and leaves process exit to
    // the caller
    let records = read_records(&mut peer, 1).await;
    assert_eq!(records[0]["level"], "FATAL");

    logger.shutdown().await;
}

#[tokio::test]
async fn test_info_below_configured_level_is_dropped() {
    let settings = LoggerSettings {
        logging_level: "WARN".to_string(),
        ..Default::default()
    };
    let (logger, mut peer) = console_logger(&settings).await;
    assert_eq!(logger.level(), Severity::Warn);

    logger.info("suppressed").await;
    logger.warn("emitted").await;
    logger.flush().await;

    let records = read_records(&mut peer, 1).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["message"], "emitted");

    logger.shutdown().await;
}

#[tokio::test]
async fn test_formatted_messages_round_trip() {
    let (logger, mut peer) = console_logger(&LoggerSettings::default()).await;

    logger
        .info(format!("processed {} items in {}ms", 42, 17))
        .await;
    logger.flush().await;

    let records = read_records(&mut peer, 1).await;
    assert_eq!(records[0]["message"], "processed 42 items in 17ms");

    logger.shutdown().await;
}

#[tokio::test]
async fn test_structured_fields_flattened_into_record() {
    let (logger, mut peer) = console_logger(&LoggerSettings::default()).await;

    let mut fields = LogFields::new();
    fields.insert("user_id".to_string(), "12345".to_string());
    fields.insert("component".to_string(), "auth".to_string());
    logger.info_with_fields("user logged in", fields).await;
    logger.flush().await;

    let records = read_records(&mut peer, 1).await;
    assert_eq!(records[0]["user_id"], "12345");
    assert_eq!(records[0]["component"], "auth");
    assert!(records[0].get("fields").is_none());

    logger.shutdown().await;
}

#[tokio::test]
async fn test_settings_loaded_from_file_drive_the_logger() {
    use std::io::Write;

    let temp_dir = tempdir().unwrap();
    let log_path = temp_dir.path().join("from_config.log");

    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        config_file,
        "log_file_name = \"{}\"\nlogging_level = \"WARN\"",
        log_path.display()
    )
    .unwrap();

    let settings = LoggerSettings::from_file(config_file.path()).unwrap();
    let (logger, _peer) = console_logger(&settings).await;

    logger.info("suppressed").await;
    logger.warn("written through config").await;
    logger.shutdown().await;

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("written through config"));
}
