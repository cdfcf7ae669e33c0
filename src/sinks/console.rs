//! Standard output sink

use crate::core::{Result, Sink};
use std::io::Write;

/// Writes records to the process's standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

impl Sink for StdoutSink {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        // single locked write per record
        std::io::stdout().lock().write_all(buf)?;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        std::io::stdout().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}
