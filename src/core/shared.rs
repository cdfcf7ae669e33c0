//! Logger handle with in-place field accumulation
//!
//! A [`SharedLogger`] keeps its fields behind a read-write lock. Appending
//! takes the exclusive lock, so each append lands atomically. Every emission
//! copies the fields under the shared lock and formats from that copy, so a
//! concurrent append can never change a record that is already being written.

use super::{
    engine::Engine,
    error::Result,
    field::Field,
    log::Log,
    log_level::LogLevel,
    logger::Logger,
};
use parking_lot::RwLock;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

pub struct SharedLogger {
    engine: Arc<Engine>,
    name: Option<Arc<str>>,
    fields: Arc<RwLock<Vec<Field>>>,
}

impl SharedLogger {
    fn from_snapshot(engine: Arc<Engine>, name: Option<Arc<str>>, fields: Vec<Field>) -> Self {
        Self {
            engine,
            name,
            fields: Arc::new(RwLock::new(fields)),
        }
    }

    /// Add fields to every future emission of this handle and of every
    /// `Arc` sharing it. Handles produced by `clone`/`fork` are unaffected.
    pub fn append<I>(&self, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        let fields: Vec<Field> = fields.into_iter().collect();
        if fields.is_empty() {
            return;
        }
        self.fields.write().extend(fields);
    }

    /// A copy of the current fields
    pub fn snapshot(&self) -> Vec<Field> {
        self.fields.read().clone()
    }

    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }

    pub fn level(&self) -> LogLevel {
        self.engine.level()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// An immutable handle frozen at the current fields
    pub fn to_logger(&self) -> Logger {
        Logger::from_parts(Arc::clone(&self.engine), self.name.clone(), self.snapshot())
    }
}

impl Clone for SharedLogger {
    /// Independent handle over a snapshot; later appends to either side are
    /// not seen by the other
    fn clone(&self) -> Self {
        Self::from_snapshot(Arc::clone(&self.engine), self.name.clone(), self.snapshot())
    }
}

impl From<Logger> for SharedLogger {
    fn from(logger: Logger) -> Self {
        let (engine, name, fields) = logger.into_parts();
        Self::from_snapshot(engine, name, fields.to_vec())
    }
}

impl fmt::Debug for SharedLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedLogger")
            .field("name", &self.name)
            .field("level", &self.engine.level())
            .field("fields", &self.len())
            .finish()
    }
}

impl Log for SharedLogger {
    fn enabled(&self, level: LogLevel) -> bool {
        self.engine.enabled(level)
    }

    fn log_at(
        &self,
        level: LogLevel,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) -> Result<()> {
        if !self.engine.enabled(level) {
            return Ok(());
        }
        let context = self.snapshot();
        self.engine
            .dispatch(level, self.name.as_deref(), &context, message, fields, caller)
    }

    fn with(&self, fields: Vec<Field>) -> Arc<dyn Log> {
        let mut merged = self.snapshot();
        merged.extend(fields);
        Arc::new(Self::from_snapshot(
            Arc::clone(&self.engine),
            self.name.clone(),
            merged,
        ))
    }

    fn fork(&self) -> Arc<dyn Log> {
        Arc::new(self.clone())
    }

    fn flush(&self) -> Result<()> {
        self.engine.sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::EncoderKind;
    use crate::sinks::MemorySink;
    use std::thread;

    fn shared(sink: &MemorySink) -> SharedLogger {
        Logger::builder()
            .encoder(EncoderKind::Json)
            .sink(sink.clone())
            .build_shared()
    }

    #[test]
    fn test_append_in_place() {
        let sink = MemorySink::new();
        let logger = shared(&sink);

        logger.append([Field::new("a", 1)]);
        logger.append([Field::new("b", 2), Field::new("c", 3)]);
        assert_eq!(logger.len(), 3);

        logger.infow("after", &[]);
        let line = &sink.json_lines()[0];
        assert_eq!(line["a"], 1);
        assert_eq!(line["c"], 3);
    }

    #[test]
    fn test_clone_is_independent() {
        let sink = MemorySink::new();
        let original = shared(&sink);
        original.append([Field::new("base", true)]);

        let copy = original.clone();
        original.append([Field::new("late", 1)]);
        copy.append([Field::new("own", 2)]);

        assert_eq!(original.len(), 2);
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.snapshot()[1].key, "own");
    }

    #[test]
    fn test_snapshot_unaffected_by_later_append() {
        let sink = MemorySink::new();
        let logger = shared(&sink);
        logger.append([Field::new("x", 1)]);

        let snap = logger.snapshot();
        logger.append([Field::new("y", 2)]);

        assert_eq!(snap.len(), 1);
        assert!(logger.to_logger().fields().len() == 2);
    }

    #[test]
    fn test_with_does_not_touch_receiver() {
        let sink = MemorySink::new();
        let logger = shared(&sink);

        let derived = Log::with(&logger, vec![Field::new("d", 1)]);
        derived.infow("derived", &[]);
        logger.infow("base", &[]);

        let lines = sink.json_lines();
        assert_eq!(lines[0]["d"], 1);
        assert!(lines[1].get("d").is_none());
        assert!(logger.is_empty());
    }

    #[test]
    fn test_concurrent_append_and_log() {
        let sink = MemorySink::new();
        let logger = Arc::new(shared(&sink));

        let mut handles = vec![];
        for t in 0..4 {
            let logger = Arc::clone(&logger);
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    logger.append([
                        Field::new(format!("key_{}_{}", t, i), i),
                        Field::new(format!("seq_{}_{}", t, i), i),
                    ]);
                    logger.infow("tick", &[]);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(logger.len(), 4 * 50 * 2);
        assert_eq!(sink.lines().len(), 4 * 50);
        for line in sink.json_lines() {
            assert!(line.is_object());
        }
    }
}
