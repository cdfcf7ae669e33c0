//! JSON encoder for structured logging
//!
//! Writes each record as a single-line JSON object (JSONL format), compatible
//! with log aggregation tools like ELK, Loki, etc.

use super::JsonObjectWriter;
use crate::core::{Encoder, EncoderConfig, EncoderKind, Record, Result};

pub struct JsonEncoder {
    config: EncoderConfig,
}

impl JsonEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new(EncoderConfig::default())
    }
}

impl Encoder for JsonEncoder {
    fn encode(&self, record: &Record<'_>, buf: &mut Vec<u8>) -> Result<()> {
        let config = &self.config;
        let mut obj = JsonObjectWriter::begin(buf);

        if !config.level_key.is_empty() {
            obj.entry(&config.level_key, &config.encode_level.encode(record.level))?;
        }

        if !config.time_key.is_empty() {
            let time = config.encode_time.format(&record.time);
            match time.parse::<i64>() {
                Ok(n) if config.encode_time.is_numeric() => obj.entry(&config.time_key, &n)?,
                _ => obj.entry(&config.time_key, &time)?,
            }
        }

        if let (false, Some(name)) = (config.name_key.is_empty(), record.name) {
            obj.entry(&config.name_key, name)?;
        }

        if let (false, Some(caller)) = (config.caller_key.is_empty(), record.caller) {
            obj.entry(&config.caller_key, &config.encode_caller.encode(caller))?;
        }

        if !config.message_key.is_empty() {
            obj.entry(&config.message_key, record.message)?;
        }

        if let (false, Some(stack)) = (config.stacktrace_key.is_empty(), &record.stack) {
            obj.entry(&config.stacktrace_key, stack)?;
        }

        for field in record.all_fields() {
            obj.entry(&field.key, &field.value.to_json_value(config.encode_duration))?;
        }

        obj.end();
        buf.extend_from_slice(config.line_ending.as_bytes());
        Ok(())
    }

    fn kind(&self) -> EncoderKind {
        EncoderKind::Json
    }
}
