//! Logger construction options
//!
//! [`Options`] is an immutable record once a logger is built. It can be
//! produced three ways: from the hard-coded defaults plus a sequence of
//! configuration functions ([`Options::configured`]), through
//! [`LoggerBuilder`](super::LoggerBuilder), or deserialized from a config
//! file with serde.
//!
//! ```
//! use kv_log_facade::core::options::{self, Options};
//! use kv_log_facade::{parse_encoder, parse_level, EncoderKind, LogLevel};
//!
//! let opts = Options::configured([
//!     options::level(parse_level("debug")),
//!     options::encoder(parse_encoder("json")),
//! ]);
//! assert_eq!(opts.level, LogLevel::Debug);
//! assert_eq!(opts.encoder, EncoderKind::Json);
//! ```

use super::encoder::{EncoderConfig, EncoderKind};
use super::log_level::LogLevel;
use crate::sinks::RotationPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A configuration function applied over the defaults
pub type Configure = Box<dyn FnOnce(&mut Options) + Send>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub encoder: EncoderKind,
    pub level: LogLevel,
    pub encoder_config: EncoderConfig,
    /// Rotating log file; `None` (or an empty path) writes to stdout
    pub filename: Option<PathBuf>,
    /// Megabytes before the file is rotated
    pub max_size: u64,
    /// Days to retain rotated files
    pub max_age: u32,
    /// Number of rotated files to retain
    pub max_backups: usize,
    /// Local time rather than UTC in rotated file names
    pub local_time: bool,
    /// Gzip rotated files
    pub compress: bool,
    /// Logger name emitted under the name key
    pub name: Option<String>,
    /// Capture a stack trace for records at or above this level
    pub stacktrace_level: Option<LogLevel>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            encoder: EncoderKind::Console,
            level: LogLevel::Info,
            encoder_config: EncoderConfig::default(),
            filename: None,
            max_size: 1,
            max_age: 7,
            max_backups: 50,
            local_time: true,
            compress: false,
            name: None,
            stacktrace_level: None,
        }
    }
}

impl Options {
    /// Apply configuration functions, in order, over the defaults
    pub fn configured<I>(fns: I) -> Self
    where
        I: IntoIterator<Item = Configure>,
    {
        let mut options = Self::default();
        for configure in fns {
            configure(&mut options);
        }
        options
    }

    /// The file destination, if one is set and non-empty
    pub fn file_path(&self) -> Option<&Path> {
        self.filename
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }

    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new()
            .with_max_size(self.max_size)
            .with_max_age(self.max_age)
            .with_max_backups(self.max_backups)
            .with_local_time(self.local_time)
            .with_compression(self.compress)
    }
}

/// Write to a rotating file at `path` instead of stdout
pub fn filename(path: impl Into<PathBuf>) -> Configure {
    let path = path.into();
    Box::new(move |o| o.filename = Some(path))
}

/// Minimum emitted level (default info)
pub fn level(level: LogLevel) -> Configure {
    Box::new(move |o| o.level = level)
}

/// JSON or console output (default console)
pub fn encoder(kind: EncoderKind) -> Configure {
    Box::new(move |o| o.encoder = kind)
}

pub fn max_size(megabytes: u64) -> Configure {
    Box::new(move |o| o.max_size = megabytes)
}

pub fn max_age(days: u32) -> Configure {
    Box::new(move |o| o.max_age = days)
}

pub fn max_backups(count: usize) -> Configure {
    Box::new(move |o| o.max_backups = count)
}

pub fn local_time(enabled: bool) -> Configure {
    Box::new(move |o| o.local_time = enabled)
}

pub fn compress(enabled: bool) -> Configure {
    Box::new(move |o| o.compress = enabled)
}

pub fn name(name: impl Into<String>) -> Configure {
    let name = name.into();
    Box::new(move |o| o.name = Some(name))
}

pub fn stacktrace_level(level: LogLevel) -> Configure {
    Box::new(move |o| o.stacktrace_level = Some(level))
}

/// Adjust key names or element encodings
pub fn encoder_config<F>(f: F) -> Configure
where
    F: FnOnce(&mut EncoderConfig) + Send + 'static,
{
    Box::new(move |o| f(&mut o.encoder_config))
}
