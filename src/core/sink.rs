//! Sink trait for log output destinations

use super::error::Result;

/// Destination for encoded records.
///
/// Every call to `write_all` carries exactly one encoded record; the engine
/// serializes calls, so implementations need not synchronize internally.
pub trait Sink: Send {
    fn write_all(&mut self, buf: &[u8]) -> Result<()>;
    /// Flush buffered bytes and make them durable where the destination allows
    fn sync(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}
