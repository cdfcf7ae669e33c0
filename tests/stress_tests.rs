//! Stress tests for concurrent field accumulation and emission
//!
//! These tests verify:
//! - Appends on a shared handle land atomically while other threads log
//! - Every record from concurrent loggers reaches the sink intact
//! - Derived handles stay isolated under concurrent derivation

use kv_log_facade::prelude::*;
use kv_log_facade::sinks::MemorySink;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const APPENDERS: usize = 8;
const APPENDS_PER_THREAD: usize = 200;
const MAX_EMITS_PER_READER: usize = 100;
const LOGGERS: usize = 8;
const RECORDS_PER_THREAD: usize = 500;

fn json_logger(sink: &MemorySink) -> Logger {
    Logger::builder()
        .encoder(EncoderKind::Json)
        .sink(sink.clone())
        .build()
}

/// Writers append key/seq pairs while readers emit; every emitted record
/// must contain whole appends only
#[test]
fn test_concurrent_append_and_emit() {
    let sink = MemorySink::new();
    let shared = Arc::new(json_logger(&sink).into_shared());
    let done = Arc::new(AtomicBool::new(false));

    let mut writers = vec![];
    for t in 0..APPENDERS {
        let shared = Arc::clone(&shared);
        writers.push(thread::spawn(move || {
            for i in 0..APPENDS_PER_THREAD {
                shared.append(fields![
                    format!("key_{}_{}", t, i) => i,
                    format!("seq_{}_{}", t, i) => i,
                ]);
            }
        }));
    }

    let mut readers = vec![];
    for _ in 0..2 {
        let shared = Arc::clone(&shared);
        let done = Arc::clone(&done);
        readers.push(thread::spawn(move || {
            let mut emitted = 0;
            while !done.load(Ordering::Acquire) && emitted < MAX_EMITS_PER_READER {
                shared.infow("progress", &[]);
                emitted += 1;
            }
            emitted
        }));
    }

    for writer in writers {
        writer.join().expect("Writer thread panicked");
    }
    done.store(true, Ordering::Release);
    let emitted: usize = readers
        .into_iter()
        .map(|r| r.join().expect("Reader thread panicked"))
        .sum();

    let snapshot = shared.snapshot();
    assert_eq!(snapshot.len(), APPENDERS * APPENDS_PER_THREAD * 2);
    for pair in snapshot.chunks(2) {
        let key = pair[0].key.strip_prefix("key_").expect("key field first");
        let seq = pair[1].key.strip_prefix("seq_").expect("seq field second");
        assert_eq!(key, seq, "append was split");
    }

    let lines = sink.lines();
    assert_eq!(lines.len(), emitted);
    for line in &lines {
        let json: serde_json::Value = serde_json::from_str(line).expect("Torn record");
        let object = json.as_object().unwrap();
        let keys = object.keys().filter(|k| k.starts_with("key_")).count();
        let seqs = object.keys().filter(|k| k.starts_with("seq_")).count();
        assert_eq!(keys, seqs, "record saw half an append");
    }
}

#[test]
fn test_concurrent_logging_no_loss() {
    let sink = MemorySink::new();
    let logger = json_logger(&sink);

    let handles: Vec<_> = (0..LOGGERS)
        .map(|t| {
            let logger = logger.with(fields!["thread" => t]);
            thread::spawn(move || {
                for i in 0..RECORDS_PER_THREAD {
                    logger.infow("tick", &fields!["i" => i]);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Logger thread panicked");
    }
    logger.flush().unwrap();

    let lines = sink.json_lines();
    assert_eq!(lines.len(), LOGGERS * RECORDS_PER_THREAD);

    let seen: HashSet<(u64, u64)> = lines
        .iter()
        .map(|l| (l["thread"].as_u64().unwrap(), l["i"].as_u64().unwrap()))
        .collect();
    assert_eq!(seen.len(), LOGGERS * RECORDS_PER_THREAD);
}

#[test]
fn test_concurrent_derivation_is_isolated() {
    let sink = MemorySink::new();
    let root: Arc<dyn Log> = Arc::new(json_logger(&sink));

    let handles: Vec<_> = (0..LOGGERS)
        .map(|t| {
            let root = Arc::clone(&root);
            thread::spawn(move || {
                let mut log = root.fork();
                for depth in 0..10 {
                    log = log.with(fields![format!("t{}_d{}", t, depth) => depth]);
                }
                log.infow("leaf", &fields!["thread" => t]);
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
    root.infow("root", &[]);

    let lines = sink.json_lines();
    assert_eq!(lines.len(), LOGGERS + 1);
    for line in &lines {
        let object = line.as_object().unwrap();
        if line["message"] == "root" {
            assert!(!object.keys().any(|k| k.starts_with('t') && k.contains("_d")));
            continue;
        }
        let t = line["thread"].as_u64().unwrap();
        let prefix = format!("t{}_", t);
        let derived: Vec<_> = object.keys().filter(|k| k.contains("_d")).collect();
        assert_eq!(derived.len(), 10);
        assert!(derived.iter().all(|k| k.starts_with(&prefix)));
    }
}
