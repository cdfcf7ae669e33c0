//! Encoder implementations

pub mod console;
pub mod json;

pub use console::ConsoleEncoder;
pub use json::JsonEncoder;

pub use crate::core::Encoder;

use crate::core::{EncoderConfig, EncoderKind, Result};
use serde::Serialize;

/// Build the encoder for `kind`
pub fn build_encoder(kind: EncoderKind, config: EncoderConfig) -> Box<dyn Encoder> {
    match kind {
        EncoderKind::Json => Box::new(JsonEncoder::new(config)),
        EncoderKind::Console => Box::new(ConsoleEncoder::new(config)),
    }
}

/// Streams a flat JSON object into a buffer, keeping insertion order and
/// duplicate keys.
pub(crate) struct JsonObjectWriter<'b> {
    buf: &'b mut Vec<u8>,
    empty: bool,
}

impl<'b> JsonObjectWriter<'b> {
    pub(crate) fn begin(buf: &'b mut Vec<u8>) -> Self {
        buf.push(b'{');
        Self { buf, empty: true }
    }

    pub(crate) fn entry<V: Serialize + ?Sized>(&mut self, key: &str, value: &V) -> Result<()> {
        if !self.empty {
            self.buf.push(b',');
        }
        self.empty = false;
        serde_json::to_writer(&mut *self.buf, key)?;
        self.buf.push(b':');
        serde_json::to_writer(&mut *self.buf, value)?;
        Ok(())
    }

    pub(crate) fn end(self) {
        self.buf.push(b'}');
    }
}
