//! The logging facade
//!
//! Application code depends on [`Log`] only. Every level has three call
//! shapes:
//!
//! | shape         | example                                        |
//! |---------------|------------------------------------------------|
//! | key-value     | `log.info(&fields!["status" => 200])`          |
//! | message       | `log.infow("served", &fields!["status" => 200])` |
//! | printf        | `log.infof("served {} in {}", &[path.into(), ms.into()])` |
//!
//! The `*v` variants (`infov`, `withv`, ...) take the message form but render
//! field values verbosely; see [`FieldValue::into_verbose`].
//!
//! Each call merges the handle's accumulated fields ahead of the call-site
//! fields. Calls below the handle's level are no-ops.

use super::engine::report_write_error;
use super::error::Result;
use super::field::{Field, FieldValue};
use super::log_level::LogLevel;
use std::panic::Location;
use std::sync::Arc;

pub trait Log: Send + Sync {
    /// Whether a record at `level` would be written
    fn enabled(&self, level: LogLevel) -> bool;

    /// Emit one record attributed to `caller`, returning any write failure
    fn log_at(
        &self,
        level: LogLevel,
        message: &str,
        fields: &[Field],
        caller: &'static Location<'static>,
    ) -> Result<()>;

    /// Derive a handle that adds `fields` to every future emission. The
    /// receiver is left unchanged.
    fn with(&self, fields: Vec<Field>) -> Arc<dyn Log>;

    /// [`Log::with`] with every field value rendered verbosely
    fn withv(&self, fields: Vec<Field>) -> Arc<dyn Log> {
        self.with(fields.into_iter().map(Field::into_verbose).collect())
    }

    /// Independent handle carrying a snapshot of the current fields
    fn fork(&self) -> Arc<dyn Log>;

    /// Flush buffered output to the destination. Failures are returned, not
    /// retried.
    fn flush(&self) -> Result<()>;

    /// Emit one record, returning any write failure to the caller
    #[track_caller]
    fn log(&self, level: LogLevel, message: &str, fields: &[Field]) -> Result<()> {
        self.log_at(level, message, fields, Location::caller())
    }

    #[track_caller]
    fn debug(&self, fields: &[Field]) {
        emit(self, LogLevel::Debug, "", fields);
    }

    #[track_caller]
    fn debugw(&self, message: &str, fields: &[Field]) {
        emit(self, LogLevel::Debug, message, fields);
    }

    #[track_caller]
    fn debugv(&self, message: &str, fields: &[Field]) {
        emitv(self, LogLevel::Debug, message, fields);
    }

    #[track_caller]
    fn debugf(&self, format: &str, args: &[FieldValue]) {
        emitf(self, LogLevel::Debug, format, args);
    }

    #[track_caller]
    fn info(&self, fields: &[Field]) {
        emit(self, LogLevel::Info, "", fields);
    }

    #[track_caller]
    fn infow(&self, message: &str, fields: &[Field]) {
        emit(self, LogLevel::Info, message, fields);
    }

    #[track_caller]
    fn infov(&self, message: &str, fields: &[Field]) {
        emitv(self, LogLevel::Info, message, fields);
    }

    #[track_caller]
    fn infof(&self, format: &str, args: &[FieldValue]) {
        emitf(self, LogLevel::Info, format, args);
    }

    #[track_caller]
    fn warn(&self, fields: &[Field]) {
        emit(self, LogLevel::Warn, "", fields);
    }

    #[track_caller]
    fn warnw(&self, message: &str, fields: &[Field]) {
        emit(self, LogLevel::Warn, message, fields);
    }

    #[track_caller]
    fn warnv(&self, message: &str, fields: &[Field]) {
        emitv(self, LogLevel::Warn, message, fields);
    }

    #[track_caller]
    fn warnf(&self, format: &str, args: &[FieldValue]) {
        emitf(self, LogLevel::Warn, format, args);
    }

    #[track_caller]
    fn error(&self, fields: &[Field]) {
        emit(self, LogLevel::Error, "", fields);
    }

    #[track_caller]
    fn errorw(&self, message: &str, fields: &[Field]) {
        emit(self, LogLevel::Error, message, fields);
    }

    #[track_caller]
    fn errorv(&self, message: &str, fields: &[Field]) {
        emitv(self, LogLevel::Error, message, fields);
    }

    #[track_caller]
    fn errorf(&self, format: &str, args: &[FieldValue]) {
        emitf(self, LogLevel::Error, format, args);
    }
}

#[track_caller]
fn emit<L: Log + ?Sized>(log: &L, level: LogLevel, message: &str, fields: &[Field]) {
    if !log.enabled(level) {
        return;
    }
    if let Err(e) = log.log_at(level, message, fields, Location::caller()) {
        report_write_error(&e);
    }
}

#[track_caller]
fn emitv<L: Log + ?Sized>(log: &L, level: LogLevel, message: &str, fields: &[Field]) {
    if !log.enabled(level) {
        return;
    }
    let fields: Vec<Field> = fields.iter().cloned().map(Field::into_verbose).collect();
    if let Err(e) = log.log_at(level, message, &fields, Location::caller()) {
        report_write_error(&e);
    }
}

#[track_caller]
fn emitf<L: Log + ?Sized>(log: &L, level: LogLevel, format: &str, args: &[FieldValue]) {
    if !log.enabled(level) {
        return;
    }
    let message = format_message(format, args);
    if let Err(e) = log.log_at(level, &message, &[], Location::caller()) {
        report_write_error(&e);
    }
}

fn debug_repr(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) => format!("{:?}", s),
        other => other.to_string(),
    }
}

/// Render a printf-style message.
///
/// - no arguments: `format` is returned verbatim
/// - empty `format`: the arguments joined by spaces
/// - otherwise `{}` (display) and `{:?}` (debug) placeholders are filled in
///   order; `{{` and `}}` are literal braces. A placeholder without an
///   argument renders `{!MISSING}` and unused arguments are appended as
///   `{!EXTRA a b}`.
///
/// ```
/// use kv_log_facade::core::log::format_message;
///
/// assert_eq!(format_message("{} took {}ms", &["query".into(), 12.into()]), "query took 12ms");
/// assert_eq!(format_message("", &["a".into(), 1.into()]), "a 1");
/// assert_eq!(format_message("100%", &[]), "100%");
/// ```
pub fn format_message(format: &str, args: &[FieldValue]) -> String {
    if args.is_empty() {
        return format.to_string();
    }
    if format.is_empty() {
        return args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
    }

    let mut out = String::with_capacity(format.len() + args.len() * 8);
    let mut args = args.iter();
    let mut rest = format;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        let consumed = if tail.starts_with("{{") {
            out.push('{');
            2
        } else if tail.starts_with("}}") {
            out.push('}');
            2
        } else if tail.starts_with("{}") {
            match args.next() {
                Some(arg) => out.push_str(&arg.to_string()),
                None => out.push_str("{!MISSING}"),
            }
            2
        } else if tail.starts_with("{:?}") {
            match args.next() {
                Some(arg) => out.push_str(&debug_repr(arg)),
                None => out.push_str("{!MISSING}"),
            }
            4
        } else {
            out.push_str(&tail[..1]);
            1
        };

        rest = &tail[consumed..];
    }
    out.push_str(rest);

    let extra: Vec<String> = args.map(ToString::to_string).collect();
    if !extra.is_empty() {
        out.push_str(" {!EXTRA ");
        out.push_str(&extra.join(" "));
        out.push('}');
    }

    out
}
