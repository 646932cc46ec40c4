use chrono::{DateTime, Utc};
use std::panic::Location;
use std::time::Duration;

use crate::severity::Severity;

/// A single normalized log entry, ready to be rendered by an encoder.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    /// Dotted logger name, if the logger was named.
    pub name: Option<String>,
    pub caller: Option<Caller>,
    pub message: String,
    /// Key-values in emission order; duplicates are kept.
    pub fields: Vec<(String, FieldValue)>,
    pub stacktrace: Option<String>,
}

impl LogRecord {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            severity,
            name: None,
            caller: None,
            message: message.into(),
            fields: Vec::new(),
            stacktrace: None,
        }
    }
}

/// Source location of the call that produced a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub file: String,
    pub line: u32,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Caller { file: file.into(), line }
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Caller::new(location.file(), location.line())
    }

    /// `dir/file:line`, keeping only the last directory.
    pub fn short(&self) -> String {
        let path = self.file.replace('\\', "/");
        let trimmed = match path.rfind('/') {
            Some(last) => match path[..last].rfind('/') {
                Some(prev) => &path[prev + 1..],
                None => path.as_str(),
            },
            None => path.as_str(),
        };
        format!("{}:{}", trimmed, self.line)
    }
}

/// Value attached to a record under a key.
///
/// Durations are kept typed so that each encoder preset can render them
/// its own way.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Json(serde_json::Value),
    Duration(Duration),
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::Json(value)
    }
}

impl From<Duration> for FieldValue {
    fn from(value: Duration) -> Self {
        FieldValue::Duration(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Json(serde_json::Value::String(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Json(serde_json::Value::String(value))
    }
}

macro_rules! json_field_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Json(serde_json::Value::from(value))
                }
            }
        )*
    };
}

json_field_from!(bool, i32, i64, u32, u64, f64);
