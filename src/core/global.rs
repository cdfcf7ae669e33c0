//! Process-wide default logger
//!
//! Prefer passing a [`Log`] handle explicitly. The default exists for code
//! that has no handle in reach; it starts as a console logger on stdout at
//! info level and can be replaced at any time.

use super::log::Log;
use super::logger::Logger;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::sync::Arc;

static DEFAULT_LOGGER: Lazy<RwLock<Arc<dyn Log>>> =
    Lazy::new(|| RwLock::new(Arc::new(Logger::default())));

/// The current default logger
pub fn default_logger() -> Arc<dyn Log> {
    Arc::clone(&DEFAULT_LOGGER.read())
}

/// Replace the default logger, returning the previous one
pub fn set_default_logger(logger: Arc<dyn Log>) -> Arc<dyn Log> {
    std::mem::replace(&mut *DEFAULT_LOGGER.write(), logger)
}

/// Replace the default logger until the returned guard is dropped
pub fn override_default_logger(logger: Arc<dyn Log>) -> DefaultLoggerGuard {
    DefaultLoggerGuard {
        previous: Some(set_default_logger(logger)),
    }
}

/// Restores the previous default logger on drop
#[must_use = "the previous default is restored when the guard is dropped"]
pub struct DefaultLoggerGuard {
    previous: Option<Arc<dyn Log>>,
}

impl Drop for DefaultLoggerGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            set_default_logger(previous);
        }
    }
}
