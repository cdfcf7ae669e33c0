//! Logging macros for ergonomic field lists and formatted messages.
//!
//! The printf macros check the level before formatting, so a suppressed call
//! never builds its message.
//!
//! # Examples
//!
//! ```
//! use kv_log_facade::prelude::*;
//! use kv_log_facade::sinks::MemorySink;
//!
//! let sink = MemorySink::new();
//! let logger = Logger::builder().encoder(EncoderKind::Json).sink(sink.clone()).build();
//!
//! let port = 8080;
//! infof!(logger, "listening on port {}", port);
//! debugf!(logger, "not formatted: {}", port);
//!
//! logger.infow("request", &fields!["method" => "GET", "status" => 200]);
//!
//! assert_eq!(sink.lines().len(), 2);
//! ```

/// Build a `Vec<Field>` from `key => value` pairs.
///
/// ```
/// use kv_log_facade::fields;
///
/// let fields = fields!["user" => "ada", "attempts" => 3];
/// assert_eq!(fields.len(), 2);
/// assert_eq!(fields[1].key, "attempts");
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        ::std::vec::Vec::<$crate::Field>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Field::new($key, $value)),+]
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __logf {
    ($logger:expr, $level:ident, $method:ident, $($arg:tt)+) => {{
        use $crate::Log as _;
        let logger = &$logger;
        if logger.enabled($crate::LogLevel::$level) {
            logger.$method(&::std::format!($($arg)+), &[]);
        }
    }};
}

/// Log a debug-level message with `format!` arguments.
///
/// ```
/// # use kv_log_facade::prelude::*;
/// # let logger = Logger::builder().level(LogLevel::Debug).build();
/// debugf!(logger, "cache size: {}", 10);
/// ```
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__logf!($logger, Debug, debugw, $($arg)+)
    };
}

/// Log an info-level message with `format!` arguments.
#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__logf!($logger, Info, infow, $($arg)+)
    };
}

/// Log a warning-level message with `format!` arguments.
#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__logf!($logger, Warn, warnw, $($arg)+)
    };
}

/// Log an error-level message with `format!` arguments.
#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__logf!($logger, Error, errorw, $($arg)+)
    };
}
