//! Immutable logger handle and its builder

use super::{
    encoder::{EncoderConfig, EncoderKind},
    engine::Engine,
    error::Result,
    field::{format_fields, Field},
    log::Log,
    log_level::LogLevel,
    options::{Configure, Options},
    shared::SharedLogger,
    sink::Sink,
};
use crate::encoders::build_encoder;
use crate::sinks::{RotatingFileSink, StdoutSink};
use std::fmt;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;

/// A cheap, cloneable logging handle.
///
/// Derivation never mutates: [`Logger::with`] returns a new handle whose
/// fields are the receiver's followed by the new ones, and the receiver keeps
/// emitting exactly what it did before. All handles derived from one logger
/// share its engine, so they share the level, encoder and destination.
#[derive(Clone)]
pub struct Logger {
    engine: Arc<Engine>,
    name: Option<Arc<str>>,
    fields: Arc<[Field]>,
}

impl Logger {
    /// Construct from the defaults plus configuration functions applied in
    /// order. Construction always succeeds; an unusable file destination is
    /// reported when the first record is written.
    pub fn new<I>(fns: I) -> Self
    where
        I: IntoIterator<Item = Configure>,
    {
        Self::from_options(Options::configured(fns))
    }

    pub fn from_options(options: Options) -> Self {
        LoggerBuilder::from_options(options).build()
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Wrap an existing engine with no name and no fields
    pub fn from_engine(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            name: None,
            fields: Arc::from(Vec::new()),
        }
    }

    /// Derive a handle carrying additional fields
    #[must_use]
    pub fn with<I>(&self, fields: I) -> Logger
    where
        I: IntoIterator<Item = Field>,
    {
        let mut merged = self.fields.to_vec();
        merged.extend(fields);
        Logger {
            engine: Arc::clone(&self.engine),
            name: self.name.clone(),
            fields: Arc::from(merged),
        }
    }

    /// Derive a child logger; names nest with a dot (`db.pool`)
    #[must_use]
    pub fn named(&self, name: &str) -> Logger {
        let name: Arc<str> = match &self.name {
            Some(parent) if !name.is_empty() => format!("{}.{}", parent, name).into(),
            Some(parent) => Arc::clone(parent),
            None => name.into(),
        };
        Logger {
            engine: Arc::clone(&self.engine),
            name: Some(name),
            fields: Arc::clone(&self.fields),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn level(&self) -> LogLevel {
        self.engine.level()
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Switch to the in-place accumulation model, starting from this
    /// handle's fields
    pub fn into_shared(self) -> SharedLogger {
        SharedLogger::from(self)
    }

    pub(crate) fn into_parts(self) -> (Arc<Engine>, Option<Arc<str>>, Arc<[Field]>) {
        (self.engine, self.name, self.fields)
    }

    pub(crate) fn from_parts(engine: Arc<Engine>, name: Option<Arc<str>>, fields: Vec<Field>) -> Self {
        Self {
            engine,
            name,
            fields: Arc::from(fields),
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::from_options(Options::default())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("level", &self.engine.level())
            .field("fields", &format_fields(&self.fields))
            .finish()
    }
}

impl Log for Logger {
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
        self.engine
            .dispatch(level, self.name.as_deref(), &self.fields, message, fields, caller)
    }

    fn with(&self, fields: Vec<Field>) -> Arc<dyn Log> {
        Arc::new(Logger::with(self, fields))
    }

    fn fork(&self) -> Arc<dyn Log> {
        Arc::new(self.clone())
    }

    fn flush(&self) -> Result<()> {
        self.engine.sync()
    }
}

/// Builder for constructing a [`Logger`] with a fluent API
///
/// # Example
/// ```
/// use kv_log_facade::prelude::*;
/// use kv_log_facade::sinks::MemorySink;
///
/// let sink = MemorySink::new();
/// let logger = Logger::builder()
///     .level(LogLevel::Debug)
///     .encoder(EncoderKind::Json)
///     .name("api")
///     .sink(sink.clone())
///     .build();
///
/// logger.debugw("ready", &[Field::new("port", 8080)]);
/// assert_eq!(sink.json_lines()[0]["port"], 8080);
/// ```
pub struct LoggerBuilder {
    options: Options,
    sink: Option<Box<dyn Sink>>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::from_options(Options::default())
    }

    pub fn from_options(options: Options) -> Self {
        Self {
            options,
            sink: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.options.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn encoder(mut self, kind: EncoderKind) -> Self {
        self.options.encoder = kind;
        self
    }

    /// Write to a size-rotated file instead of stdout
    #[must_use = "builder methods return a new value"]
    pub fn filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.filename = Some(path.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_size(mut self, megabytes: u64) -> Self {
        self.options.max_size = megabytes;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_age(mut self, days: u32) -> Self {
        self.options.max_age = days;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn max_backups(mut self, count: usize) -> Self {
        self.options.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn local_time(mut self, enabled: bool) -> Self {
        self.options.local_time = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn compress(mut self, enabled: bool) -> Self {
        self.options.compress = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.options.name = Some(name.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn stacktrace_level(mut self, level: LogLevel) -> Self {
        self.options.stacktrace_level = Some(level);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn encoder_config(mut self, config: EncoderConfig) -> Self {
        self.options.encoder_config = config;
        self
    }

    /// Apply a configuration function
    #[must_use = "builder methods return a new value"]
    pub fn configure(mut self, configure: Configure) -> Self {
        configure(&mut self.options);
        self
    }

    /// Send output to `sink`, overriding the file/stdout choice
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn build(self) -> Logger {
        let options = self.options;
        let sink: Box<dyn Sink> = match self.sink {
            Some(sink) => sink,
            None => match options.file_path() {
                Some(path) => Box::new(RotatingFileSink::with_policy(
                    path,
                    options.rotation_policy(),
                )),
                None => Box::new(StdoutSink::new()),
            },
        };

        let encoder = build_encoder(options.encoder, options.encoder_config);
        let engine =
            Engine::new(options.level, encoder, sink).with_stacktrace_level(options.stacktrace_level);

        Logger {
            engine: Arc::new(engine),
            name: options.name.map(Arc::from),
            fields: Arc::from(Vec::new()),
        }
    }

    pub fn build_shared(self) -> SharedLogger {
        self.build().into_shared()
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
