//! Encoder trait and encoder configuration
//!
//! An encoder turns a [`Record`] into the bytes of a single log line. Two
//! kinds exist: machine-readable JSON and human-readable console output.

use super::error::Result;
use super::field::DurationEncoding;
use super::log_level::LogLevel;
use super::record::Record;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use std::str::FromStr;

pub trait Encoder: Send + Sync {
    /// Append one encoded record, including the line ending, to `buf`
    fn encode(&self, record: &Record<'_>, buf: &mut Vec<u8>) -> Result<()>;
    fn kind(&self) -> EncoderKind;
}

/// Supported output encodings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum EncoderKind {
    Json,
    #[default]
    Console,
}

impl EncoderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncoderKind::Json => "json",
            EncoderKind::Console => "console",
        }
    }
}

/// Parse an encoder name.
///
/// `"json"` and `"console"` are recognised; anything else yields
/// [`EncoderKind::Console`]. Never fails.
pub fn parse_encoder(s: &str) -> EncoderKind {
    s.parse().unwrap_or_default()
}

impl fmt::Display for EncoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncoderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "json" => Ok(EncoderKind::Json),
            "console" => Ok(EncoderKind::Console),
            _ => Err(format!("Invalid encoder: '{}'", s)),
        }
    }
}

impl From<String> for EncoderKind {
    fn from(s: String) -> Self {
        parse_encoder(&s)
    }
}

/// How the level is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelEncoding {
    /// `DEG`, `INF`, `WRN`, `ERR`
    #[default]
    Short,
    /// `debug`, `info`, `warn`, `error`
    Lowercase,
    /// `DEBUG`, `INFO`, `WARN`, `ERROR`
    Capital,
    /// Like `Capital`, wrapped in ANSI colour codes when the `console`
    /// feature is enabled
    CapitalColor,
}

impl LevelEncoding {
    pub fn encode(&self, level: LogLevel) -> String {
        match self {
            LevelEncoding::Short => level.short_name().to_string(),
            LevelEncoding::Lowercase => level.as_str().to_string(),
            LevelEncoding::Capital => level.to_uppercase_str().to_string(),
            LevelEncoding::CapitalColor => colorize(level),
        }
    }
}

#[cfg(feature = "console")]
fn colorize(level: LogLevel) -> String {
    use colored::Colorize;
    level
        .to_uppercase_str()
        .color(level.color_code())
        .to_string()
}

#[cfg(not(feature = "console"))]
fn colorize(level: LogLevel) -> String {
    level.to_uppercase_str().to_string()
}

/// How the caller location is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerEncoding {
    /// Last directory and file name: `core/logger.rs:42`
    #[default]
    Short,
    /// Path as recorded by the compiler: `src/core/logger.rs:42`
    Full,
}

impl CallerEncoding {
    pub fn encode(&self, caller: &Location<'_>) -> String {
        match self {
            CallerEncoding::Full => format!("{}:{}", caller.file(), caller.line()),
            CallerEncoding::Short => {
                let file = caller.file();
                let trimmed = file
                    .rfind(['/', '\\'])
                    .and_then(|last| file[..last].rfind(['/', '\\']))
                    .map_or(file, |prev| &file[prev + 1..]);
                format!("{}:{}", trimmed, caller.line())
            }
        }
    }
}

/// Key names and element encodings shared by both encoders.
///
/// An empty key omits that element from the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub message_key: String,
    pub level_key: String,
    pub time_key: String,
    pub name_key: String,
    pub caller_key: String,
    pub stacktrace_key: String,
    pub line_ending: String,
    pub encode_level: LevelEncoding,
    pub encode_time: TimestampFormat,
    pub encode_duration: DurationEncoding,
    pub encode_caller: CallerEncoding,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            message_key: "message".to_string(),
            level_key: "level".to_string(),
            time_key: "time".to_string(),
            name_key: "name".to_string(),
            caller_key: "caller".to_string(),
            stacktrace_key: "stack".to_string(),
            line_ending: "\n".to_string(),
            encode_level: LevelEncoding::default(),
            encode_time: TimestampFormat::default(),
            encode_duration: DurationEncoding::default(),
            encode_caller: CallerEncoding::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_encoder() {
        assert_eq!(parse_encoder("json"), EncoderKind::Json);
        assert_eq!(parse_encoder("console"), EncoderKind::Console);
    }

    #[test]
    fn test_parse_encoder_falls_back_to_console() {
        assert_eq!(parse_encoder(""), EncoderKind::Console);
        assert_eq!(parse_encoder("JSON"), EncoderKind::Console);
        assert_eq!(parse_encoder("xml"), EncoderKind::Console);
    }

    #[test]
    fn test_encoder_kind_serde() {
        let kind: EncoderKind = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(kind, EncoderKind::Json);
        let kind: EncoderKind = serde_json::from_str("\"yaml\"").unwrap();
        assert_eq!(kind, EncoderKind::Console);
    }

    #[test]
    fn test_level_encodings() {
        assert_eq!(LevelEncoding::Short.encode(LogLevel::Warn), "WRN");
        assert_eq!(LevelEncoding::Lowercase.encode(LogLevel::Warn), "warn");
        assert_eq!(LevelEncoding::Capital.encode(LogLevel::Warn), "WARN");
        assert!(LevelEncoding::CapitalColor
            .encode(LogLevel::Warn)
            .contains("WARN"));
    }

    #[test]
    fn test_caller_encodings() {
        let caller = Location::caller();
        let full = CallerEncoding::Full.encode(caller);
        let short = CallerEncoding::Short.encode(caller);

        assert!(full.ends_with(&format!("encoder.rs:{}", caller.line())));
        assert!(short.ends_with(&format!("core/encoder.rs:{}", caller.line())));
        assert!(short.len() <= full.len());
    }

    #[test]
    fn test_default_config_keys() {
        let config = EncoderConfig::default();
        assert_eq!(config.message_key, "message");
        assert_eq!(config.level_key, "level");
        assert_eq!(config.time_key, "time");
        assert_eq!(config.name_key, "name");
        assert_eq!(config.caller_key, "caller");
        assert_eq!(config.stacktrace_key, "stack");
        assert_eq!(config.line_ending, "\n");
    }
}
