//! Log record handed from a logger handle to the engine

use super::field::Field;
use super::log_level::LogLevel;
use chrono::{DateTime, Local};
use std::panic::Location;

/// One emission, borrowed from the call site.
///
/// Accumulated fields come first and call-site fields second; duplicate keys
/// are kept as-is and resolved by whoever reads the output.
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub level: LogLevel,
    pub time: DateTime<Local>,
    pub name: Option<&'a str>,
    pub caller: Option<&'static Location<'static>>,
    pub message: &'a str,
    pub context: &'a [Field],
    pub fields: &'a [Field],
    pub stack: Option<String>,
}

impl<'a> Record<'a> {
    pub fn new(level: LogLevel, message: &'a str) -> Self {
        Self {
            level,
            time: Local::now(),
            name: None,
            caller: None,
            message,
            context: &[],
            fields: &[],
            stack: None,
        }
    }

    pub fn with_name(mut self, name: Option<&'a str>) -> Self {
        self.name = name;
        self
    }

    pub fn with_caller(mut self, caller: &'static Location<'static>) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Accumulated fields of the emitting handle
    pub fn with_context(mut self, context: &'a [Field]) -> Self {
        self.context = context;
        self
    }

    /// Call-site fields
    pub fn with_fields(mut self, fields: &'a [Field]) -> Self {
        self.fields = fields;
        self
    }

    /// All fields in merge order: accumulated, then call-site
    pub fn all_fields(&self) -> impl Iterator<Item = &'a Field> {
        self.context.iter().chain(self.fields.iter())
    }

    pub fn has_fields(&self) -> bool {
        !self.context.is_empty() || !self.fields.is_empty()
    }
}
