//! Key-value fields attached to log records
//!
//! This module provides:
//! - `FieldValue`: the loggable value union (primitives, strings, durations,
//!   nested JSON, and stringified fallbacks)
//! - `Field`: one key-value pair
//! - the `fields!` macro (see `macros.rs`) for building field lists

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Value type for structured logging fields
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Duration(Duration),
    /// Nested structure, usually produced by [`FieldValue::serialize`]
    Json(serde_json::Value),
    Null,
}

impl FieldValue {
    /// Stringify any `Display` value
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        FieldValue::String(value.to_string())
    }

    /// Stringify any `Debug` value (`{:?}`)
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        FieldValue::String(format!("{:?}", value))
    }

    /// Stringify any `Debug` value in its verbose, multi-line form (`{:#?}`)
    pub fn verbose<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        FieldValue::String(format!("{:#?}", value))
    }

    /// Capture a serializable value as nested JSON.
    ///
    /// Values that fail to serialize fall back to an error string rather than
    /// failing the log call.
    pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => FieldValue::Json(json),
            Err(e) => FieldValue::String(format!("<serialize error: {}>", e)),
        }
    }

    /// Verbose rendering used by the `*v` emission methods: nested JSON is
    /// pretty-printed and durations become their human readable form.
    /// Scalars keep their type.
    #[must_use]
    pub fn into_verbose(self) -> Self {
        match self {
            FieldValue::Json(v) => match serde_json::to_string_pretty(&v) {
                Ok(pretty) => FieldValue::String(pretty),
                Err(_) => FieldValue::Json(v),
            },
            FieldValue::Duration(d) => FieldValue::String(format!("{:?}", d)),
            other => other,
        }
    }

    /// Convert to serde_json::Value, rendering durations as given
    #[must_use]
    pub fn to_json_value(&self, durations: DurationEncoding) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::UInt(u) => serde_json::Value::Number((*u).into()),
            FieldValue::Float(f) => float_value(*f),
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Duration(d) => durations.encode(*d),
            FieldValue::Json(v) => v.clone(),
            FieldValue::Null => serde_json::Value::Null,
        }
    }
}

/// Non-finite floats have no JSON number form; they are written as strings.
fn float_value(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(f.to_string()))
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::UInt(u) => write!(f, "{}", u),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Duration(d) => write!(f, "{:?}", d),
            FieldValue::Json(v) => write!(f, "{}", v),
            FieldValue::Null => write!(f, "null"),
        }
    }
}

/// How `FieldValue::Duration` is rendered by the encoders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationEncoding {
    /// Floating-point seconds: `1.5`
    #[default]
    Seconds,
    /// Integer milliseconds: `1500`
    Millis,
    /// Integer nanoseconds: `1500000000`
    Nanos,
    /// Human readable string: `"1.5s"`
    String,
}

impl DurationEncoding {
    pub fn encode(&self, d: Duration) -> serde_json::Value {
        match self {
            DurationEncoding::Seconds => float_value(d.as_secs_f64()),
            DurationEncoding::Millis => serde_json::Value::Number(saturating_u64(d.as_millis()).into()),
            DurationEncoding::Nanos => serde_json::Value::Number(saturating_u64(d.as_nanos()).into()),
            DurationEncoding::String => serde_json::Value::String(format!("{:?}", d)),
        }
    }
}

fn saturating_u64(v: u128) -> u64 {
    u64::try_from(v).unwrap_or(u64::MAX)
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for FieldValue {
                fn from(v: $t) -> Self {
                    FieldValue::$variant(v as $target)
                }
            }
        )+
    };
}

impl_from_int!(Int, i64, i8, i16, i32, i64, isize);
impl_from_int!(UInt, u64, u8, u16, u32, u64, usize);

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::String(s.clone())
    }
}

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f as f64)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Duration> for FieldValue {
    fn from(d: Duration) -> Self {
        FieldValue::Duration(d)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::Json(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// A single key-value pair
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Field {
    #[must_use]
    pub fn into_verbose(self) -> Self {
        Self {
            key: self.key,
            value: self.value.into_verbose(),
        }
    }
}

impl<K, V> From<(K, V)> for Field
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from((key, value): (K, V)) -> Self {
        Field::new(key, value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Format fields as space separated key=value pairs
pub fn format_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
