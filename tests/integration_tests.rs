//! Integration tests for the logging facade
//!
//! These tests verify:
//! - File output and flushing
//! - JSON and console record layout
//! - Contextual fields through derived handles and contexts
//! - Rotation across backups
//! - Write failures surface without panicking

use kv_log_facade::core::options;
use kv_log_facade::prelude::*;
use kv_log_facade::sinks::{MemorySink, RotatingFileSink, RotationPolicy, WriterSink};
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn json_logger(sink: &MemorySink) -> Logger {
    Logger::builder()
        .encoder(EncoderKind::Json)
        .sink(sink.clone())
        .build()
}

#[test]
fn test_file_logging_flushes_every_record() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("app.log");

    let logger = Logger::new([
        options::filename(&log_file),
        options::encoder(parse_encoder("json")),
        options::level(parse_level("debug")),
    ]);

    for i in 0..100 {
        logger.debugw("entry", &fields!["seq" => i]);
    }
    logger.flush().expect("Failed to flush");

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 100);

    for (i, line) in lines.iter().enumerate() {
        let json: serde_json::Value = serde_json::from_str(line).expect("Invalid JSON line");
        assert_eq!(json["seq"], i);
        assert_eq!(json["level"], "DEG");
    }
}

#[test]
fn test_json_record_layout() {
    let sink = MemorySink::new();
    let logger = json_logger(&sink).named("http");

    logger.infow("served", &fields!["path" => "/health", "elapsed" => Duration::from_millis(1500)]);

    let line = sink.lines().remove(0);
    let json: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(json["level"], "INF");
    assert_eq!(json["name"], "http");
    assert_eq!(json["message"], "served");
    assert_eq!(json["path"], "/health");
    assert_eq!(json["elapsed"], 1.5);
    assert!(json["caller"].as_str().unwrap().contains("integration_tests.rs:"));

    let keys = ["\"level\"", "\"time\"", "\"name\"", "\"caller\"", "\"message\"", "\"path\""];
    let positions: Vec<usize> = keys.iter().map(|k| line.find(k).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "key order in {}", line);
}

#[test]
fn test_console_record_layout() {
    let sink = MemorySink::new();
    let logger = Logger::builder().sink(sink.clone()).build();

    logger.warnw("disk low\nsecond line", &fields!["free_mb" => 12]);

    let lines = sink.lines();
    assert_eq!(lines.len(), 1, "message must stay on one line");
    let columns: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(columns.len(), 5);
    assert_eq!(columns[1], "WRN");
    assert!(columns[2].contains("integration_tests.rs:"));
    assert_eq!(columns[3], "disk low\\nsecond line");
    assert_eq!(columns[4], r#"{"free_mb":12}"#);
}

#[test]
fn test_custom_keys_and_encodings() {
    let sink = MemorySink::new();
    let logger = Logger::builder()
        .encoder(EncoderKind::Json)
        .configure(options::encoder_config(|c| {
            c.message_key = "msg".to_string();
            c.caller_key = String::new();
            c.encode_level = kv_log_facade::core::LevelEncoding::Lowercase;
            c.encode_time = kv_log_facade::TimestampFormat::Unix;
        }))
        .sink(sink.clone())
        .build();

    logger.errorw("boom", &[]);

    let json = &sink.json_lines()[0];
    assert_eq!(json["msg"], "boom");
    assert_eq!(json["level"], "error");
    assert!(json.get("caller").is_none());
    assert!(json["time"].is_i64());
}

#[test]
fn test_derived_fields_precede_call_site_fields() {
    let sink = MemorySink::new();
    let base = json_logger(&sink);
    let request = base.with(fields!["request_id" => "r-1"]);

    request.infow("first", &fields!["step" => 1]);
    base.infow("untouched", &[]);
    request.info(&fields!["step" => 2]);

    let lines = sink.lines();
    assert!(lines[0].find("request_id").unwrap() < lines[0].find("step").unwrap());
    assert!(!lines[1].contains("request_id"));
    assert!(lines[2].contains("\"request_id\":\"r-1\""));
}

#[test]
fn test_logger_travels_through_context() {
    struct Handler;

    impl Handler {
        fn serve(&self, ctx: &Context) {
            let log = from_context(ctx).expect("logger attached upstream");
            log.infow("handled", &fields!["handler" => "users"]);
        }
    }

    let sink = MemorySink::new();
    let root: Arc<dyn Log> = Arc::new(json_logger(&sink));
    let request_log = root.with(fields!["request_id" => "abc"]);
    let ctx = new_context(&Context::background(), request_log);

    Handler.serve(&ctx);

    let json = &sink.json_lines()[0];
    assert_eq!(json["request_id"], "abc");
    assert_eq!(json["handler"], "users");
}

#[test]
fn test_shared_logger_accumulates_in_place() {
    let sink = MemorySink::new();
    let shared = json_logger(&sink).into_shared();

    shared.append(fields!["user" => "ada"]);
    let forked = shared.fork();
    shared.append(fields!["role" => "admin"]);

    shared.infow("shared", &[]);
    forked.infow("forked", &[]);

    let lines = sink.json_lines();
    assert_eq!(lines[0]["role"], "admin");
    assert_eq!(lines[1]["user"], "ada");
    assert!(lines[1].get("role").is_none());
}

#[test]
fn test_rotation_keeps_every_record() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotate.log");

    let sink = RotatingFileSink::with_policy(&log_file, RotationPolicy::new().with_max_bytes(512));
    let logger = Logger::builder().encoder(EncoderKind::Json).sink(sink).build();

    for i in 0..20 {
        logger.infow("rotating", &fields!["seq" => i]);
    }
    logger.flush().unwrap();

    let mut total = 0;
    let mut files = 0;
    for entry in fs::read_dir(temp_dir.path()).unwrap() {
        let path = entry.unwrap().path();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.len() <= 512, "{} is {} bytes", path.display(), content.len());
        total += content.lines().count();
        files += 1;
    }

    assert!(files > 1, "expected at least one backup");
    assert_eq!(total, 20);
}

#[test]
fn test_printf_forms() {
    let sink = MemorySink::new();
    let logger = json_logger(&sink);

    logger.infof("user {} logged in from {:?}", &["ada".into(), "10.0.0.1".into()]);
    logger.infof("", &["joined".into(), 3.into()]);
    logger.infof("100% literal {}", &[]);

    let lines = sink.json_lines();
    assert_eq!(lines[0]["message"], "user ada logged in from \"10.0.0.1\"");
    assert_eq!(lines[1]["message"], "joined 3");
    assert_eq!(lines[2]["message"], "100% literal {}");
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "device unavailable"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "device unavailable"))
    }
}

#[test]
fn test_write_failures_do_not_panic() {
    let logger = Logger::builder()
        .sink(WriterSink::new(FailingWriter))
        .build();

    logger.infow("lost", &[]);
    logger.errorf("also {}", &["lost".into()]);

    assert!(logger.log(LogLevel::Info, "returned", &[]).is_err());
    assert!(logger.flush().is_err());
}

#[test]
fn test_unwritable_file_reports_on_write() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = temp_dir.path().join("not_a_dir");
    fs::write(&blocker, b"file").unwrap();

    let logger = Logger::new([options::filename(blocker.join("app.log"))]);
    assert!(logger.log(LogLevel::Error, "cannot open", &[]).is_err());
    logger.errorw("still no panic", &[]);
}
