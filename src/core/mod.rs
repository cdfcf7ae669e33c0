//! Core logger types and traits

pub mod context;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod field;
pub mod global;
pub mod log;
pub mod log_level;
pub mod logger;
pub mod options;
pub mod record;
pub mod shared;
pub mod sink;
pub mod timestamp;

pub use context::{from_context, new_context, Context};
pub use encoder::{parse_encoder, CallerEncoding, Encoder, EncoderConfig, EncoderKind, LevelEncoding};
pub use engine::Engine;
pub use error::{LoggerError, Result};
pub use field::{DurationEncoding, Field, FieldValue};
pub use global::{default_logger, override_default_logger, set_default_logger, DefaultLoggerGuard};
pub use log::{format_message, Log};
pub use log_level::{parse_level, LogLevel};
pub use logger::{Logger, LoggerBuilder};
pub use options::{Configure, Options};
pub use record::Record;
pub use shared::SharedLogger;
pub use sink::Sink;
pub use timestamp::TimestampFormat;
