//! In-memory sink
//!
//! Captures encoded records in a shared buffer instead of writing them
//! anywhere, which makes it the sink of choice for tests that need to inspect
//! what a logger emitted. Clones share the same buffer.

use crate::core::{Result, Sink};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
    syncs: Arc<Mutex<usize>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }

    /// Every line parsed as JSON; lines that are not JSON are skipped
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.contents()
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    pub fn sync_count(&self) -> usize {
        *self.syncs.lock()
    }

    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.buf.lock().extend_from_slice(buf);
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        *self.syncs.lock() += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
