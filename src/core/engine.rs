//! Backend engine shared by logger handles
//!
//! The engine owns everything a handle does not: the level threshold, the
//! encoder and the sink. Handles are cheap wrappers that add accumulated
//! fields and a name, so any number of them can share one engine.

use super::{
    encoder::Encoder,
    error::{LoggerError, Result},
    field::Field,
    log_level::LogLevel,
    record::Record,
    sink::Sink,
};
use parking_lot::Mutex;
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;

pub struct Engine {
    level: LogLevel,
    encoder: Box<dyn Encoder>,
    sink: Mutex<Box<dyn Sink>>,
    stacktrace_level: Option<LogLevel>,
}

impl Engine {
    pub fn new(level: LogLevel, encoder: Box<dyn Encoder>, sink: Box<dyn Sink>) -> Self {
        Self {
            level,
            encoder,
            sink: Mutex::new(sink),
            stacktrace_level: None,
        }
    }

    /// Attach a stack trace to records at or above `level`
    #[must_use]
    pub fn with_stacktrace_level(mut self, level: Option<LogLevel>) -> Self {
        self.stacktrace_level = level;
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    /// Build a record for one emission and write it.
    ///
    /// Below-threshold records return `Ok(())` without touching the encoder
    /// or the sink.
    pub fn dispatch(
        &self,
        level: LogLevel,
        name: Option<&str>,
        context: &[Field],
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }

        let mut record = Record::new(level, message)
            .with_name(name)
            .with_caller(caller)
            .with_context(context)
            .with_fields(fields);

        if self.stacktrace_level.is_some_and(|min| level >= min) {
            record.stack = Some(Backtrace::force_capture().to_string());
        }

        self.write(&record)
    }

    /// Encode a record and hand it to the sink as a single write
    pub fn write(&self, record: &Record<'_>) -> Result<()> {
        let mut buf = Vec::with_capacity(256);
        self.encoder.encode(record, &mut buf)?;
        self.sink.lock().write_all(&buf)
    }

    pub fn sync(&self) -> Result<()> {
        self.sink.lock().sync()
    }

    pub fn sink_name(&self) -> String {
        self.sink.lock().name().to_string()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("level", &self.level)
            .field("encoder", &self.encoder.kind())
            .field("stacktrace_level", &self.stacktrace_level)
            .finish_non_exhaustive()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(e) = self.sink.get_mut().sync() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
        }
    }
}

/// Report a failed write on stderr; emission never panics and never
/// silently drops the failure.
pub(crate) fn report_write_error(err: &LoggerError) {
    eprintln!("[LOGGER ERROR] Failed to write log record: {}", err);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoders::JsonEncoder;
    use crate::sinks::MemorySink;

    fn engine(level: LogLevel, sink: &MemorySink) -> Engine {
        Engine::new(level, Box::new(JsonEncoder::default()), Box::new(sink.clone()))
    }

    #[test]
    fn test_threshold() {
        let sink = MemorySink::new();
        let engine = engine(LogLevel::Warn, &sink);

        assert!(!engine.enabled(LogLevel::Debug));
        assert!(!engine.enabled(LogLevel::Info));
        assert!(engine.enabled(LogLevel::Warn));
        assert!(engine.enabled(LogLevel::Error));

        engine
            .dispatch(LogLevel::Info, None, &[], "dropped", &[], Location::caller())
            .unwrap();
        engine
            .dispatch(LogLevel::Error, None, &[], "kept", &[], Location::caller())
            .unwrap();

        let lines = sink.json_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["message"], "kept");
    }

    #[test]
    fn test_stacktrace_level() {
        let sink = MemorySink::new();
        let engine = engine(LogLevel::Debug, &sink).with_stacktrace_level(Some(LogLevel::Error));

        engine
            .dispatch(LogLevel::Warn, None, &[], "no stack", &[], Location::caller())
            .unwrap();
        engine
            .dispatch(LogLevel::Error, None, &[], "with stack", &[], Location::caller())
            .unwrap();

        let lines = sink.json_lines();
        assert!(lines[0].get("stack").is_none());
        assert!(lines[1]["stack"].is_string());
    }

    #[test]
    fn test_sync_reaches_sink() {
        let sink = MemorySink::new();
        let engine = engine(LogLevel::Info, &sink);

        engine.sync().unwrap();
        assert_eq!(sink.sync_count(), 1);
        assert_eq!(engine.sink_name(), "memory");
    }
}
