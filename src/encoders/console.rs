//! Console encoder implementation
//!
//! Human-readable, tab-separated output:
//!
//! ```text
//! 2025-01-08 10:30:45	INF	core/logger.rs:42	request served	{"req_id":"abc","status":200}
//! ```

use super::JsonObjectWriter;
use crate::core::{Encoder, EncoderConfig, EncoderKind, Record, Result};

pub struct ConsoleEncoder {
    config: EncoderConfig,
}

impl ConsoleEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Escape line breaks and tabs so one record always stays on one line
    /// with a fixed set of columns
    fn sanitize(text: &str) -> String {
        text
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }
}

impl Default for ConsoleEncoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default())
    }
}

impl Encoder for ConsoleEncoder {
    fn encode(&self, record: &Record<'_>, buf: &mut Vec<u8>) -> Result<()> {
        let config = &self.config;
        let mut columns: Vec<String> = Vec::with_capacity(5);

        if !config.time_key.is_empty() {
            columns.push(config.encode_time.format(&record.time));
        }
        if !config.level_key.is_empty() {
            columns.push(config.encode_level.encode(record.level));
        }
        if let (false, Some(name)) = (config.name_key.is_empty(), record.name) {
            columns.push(Self::sanitize(name));
        }
        if let (false, Some(caller)) = (config.caller_key.is_empty(), record.caller) {
            columns.push(config.encode_caller.encode(caller));
        }
        if !config.message_key.is_empty() {
            columns.push(Self::sanitize(record.message));
        }

        buf.extend_from_slice(columns.join("\t").as_bytes());

        if record.has_fields() {
            if !columns.is_empty() {
                buf.push(b'\t');
            }
            let mut obj = JsonObjectWriter::begin(buf);
            for field in record.all_fields() {
                obj.entry(&field.key, &field.value.to_json_value(config.encode_duration))?;
            }
            obj.end();
        }

        if let (false, Some(stack)) = (config.stacktrace_key.is_empty(), &record.stack) {
            buf.push(b'\n');
            buf.extend_from_slice(stack.as_bytes());
        }

        buf.extend_from_slice(config.line_ending.as_bytes());
        Ok(())
    }

    fn kind(&self) -> EncoderKind {
        EncoderKind::Console
    }
}
