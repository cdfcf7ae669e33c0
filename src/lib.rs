//! # kv_log_facade
//!
//! A structured key-value logging facade. Application code talks to the
//! [`Log`] trait; the backend encodes records as JSON or console lines and
//! writes them to stdout or a size-rotated file.
//!
//! ## Features
//!
//! - **Three call shapes**: key-value, message plus fields, and printf
//! - **Contextual fields**: derive handles that carry fields into every record
//! - **Context binding**: attach a logger to a request-scoped [`Context`]
//! - **Rotation**: size-based file rotation with retention and gzip
//!
//! ```
//! use kv_log_facade::prelude::*;
//! use kv_log_facade::sinks::MemorySink;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder()
//!     .encoder(EncoderKind::Json)
//!     .sink(sink.clone())
//!     .build();
//!
//! let request = logger.with(fields!["request_id" => "r-17"]);
//! request.infow("served", &fields!["status" => 200]);
//! infof!(request, "took {}ms", 12);
//!
//! let lines = sink.json_lines();
//! assert_eq!(lines[0]["request_id"], "r-17");
//! assert_eq!(lines[1]["message"], "took 12ms");
//! ```

pub mod core;
pub mod encoders;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        from_context, new_context, parse_encoder, parse_level, Context, EncoderKind, Field,
        FieldValue, Log, LogLevel, Logger, LoggerBuilder, LoggerError, Options, Result,
        SharedLogger,
    };
    pub use crate::{debugf, errorf, fields, infof, warnf};
}

pub use self::core::{
    default_logger, format_message, from_context, new_context, override_default_logger,
    parse_encoder, parse_level, set_default_logger, Configure, Context, DefaultLoggerGuard,
    EncoderConfig, EncoderKind, Field, FieldValue, Log, LogLevel, Logger, LoggerBuilder,
    LoggerError, Options, Result, SharedLogger, Sink, TimestampFormat,
};
pub use sinks::{MemorySink, RotatingFileSink, RotationPolicy, StdoutSink, WriterSink};
