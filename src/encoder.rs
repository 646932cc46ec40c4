use chrono::{DateTime, FixedOffset, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::record::{FieldValue, LogRecord};
use crate::severity::Severity;

/// Which preset a logger is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

impl Mode {
    pub fn from_development_flag(development: bool) -> Self {
        if development {
            Mode::Development
        } else {
            Mode::Production
        }
    }

    /// Output format that goes with the preset.
    pub fn encoding(self) -> Encoding {
        match self {
            Mode::Development => Encoding::Console,
            Mode::Production => Encoding::Json,
        }
    }
}

/// Output format of a logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Tab-separated, human-readable lines.
    Console,
    /// One JSON object per line.
    Json,
}

/// Keys under which the fixed record elements are written.
///
/// An empty key omits the element entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldKeys {
    pub time: &'static str,
    pub severity: &'static str,
    pub name: &'static str,
    pub caller: &'static str,
    pub message: &'static str,
    pub stacktrace: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityRenderer {
    /// Integer verbosity, the inverse of [`Severity::from_verbosity`].
    Verbosity,
    /// Lowercase level name, e.g. `info`.
    LowercaseName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRenderer {
    /// RFC3339 with nanoseconds, normalized to UTC.
    Rfc3339NanoUtc,
    /// ISO-8601 in local time with milliseconds; numeric offset, or `Z`
    /// when the offset is zero.
    Iso8601Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationRenderer {
    /// Floating-point seconds.
    Seconds,
    /// Human-readable string such as `1.5s`.
    String,
}

/// Immutable description of how records are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    pub keys: FieldKeys,
    pub severity: SeverityRenderer,
    pub time: TimeRenderer,
    pub duration: DurationRenderer,
}

/// JSON preset with long keys.
pub const PRODUCTION_ENCODER: EncoderConfig = EncoderConfig {
    keys: FieldKeys {
        time: "timestamp",
        severity: "verbosity",
        name: "logger",
        caller: "caller",
        message: "message",
        stacktrace: "stacktrace",
    },
    severity: SeverityRenderer::Verbosity,
    time: TimeRenderer::Rfc3339NanoUtc,
    duration: DurationRenderer::Seconds,
};

/// Console preset with single-letter keys.
pub const DEVELOPMENT_ENCODER: EncoderConfig = EncoderConfig {
    keys: FieldKeys {
        time: "T",
        severity: "V",
        name: "N",
        caller: "C",
        message: "M",
        stacktrace: "S",
    },
    severity: SeverityRenderer::Verbosity,
    time: TimeRenderer::Iso8601Local,
    duration: DurationRenderer::String,
};

/// Minimal preset of the fallback logger: no time, caller or stacktrace.
pub const EXAMPLE_ENCODER: EncoderConfig = EncoderConfig {
    keys: FieldKeys {
        time: "",
        severity: "level",
        name: "logger",
        caller: "",
        message: "msg",
        stacktrace: "",
    },
    severity: SeverityRenderer::LowercaseName,
    time: TimeRenderer::Rfc3339NanoUtc,
    duration: DurationRenderer::String,
};

impl EncoderConfig {
    /// Select the preset for `mode`. Presets are used wholesale.
    pub fn for_mode(mode: Mode) -> &'static EncoderConfig {
        match mode {
            Mode::Development => &DEVELOPMENT_ENCODER,
            Mode::Production => &PRODUCTION_ENCODER,
        }
    }

    /// Render `record` with the given output format, newline-terminated.
    pub fn encode(&self, encoding: Encoding, record: &LogRecord) -> Result<Vec<u8>, serde_json::Error> {
        match encoding {
            Encoding::Json => self.encode_json(record),
            Encoding::Console => self.encode_console(record),
        }
    }

    /// One JSON object: severity, time, name, caller, message, fields,
    /// stacktrace, in that order.
    pub fn encode_json(&self, record: &LogRecord) -> Result<Vec<u8>, serde_json::Error> {
        let keys = &self.keys;
        let mut obj = JsonObject::new();

        if !keys.severity.is_empty() {
            obj.entry(keys.severity, &self.render_severity(record.severity))?;
        }
        if !keys.time.is_empty() {
            obj.entry(keys.time, &Value::String(self.render_time(&record.timestamp)))?;
        }
        if let (false, Some(name)) = (keys.name.is_empty(), &record.name) {
            obj.entry(keys.name, &Value::String(name.clone()))?;
        }
        if let (false, Some(caller)) = (keys.caller.is_empty(), &record.caller) {
            obj.entry(keys.caller, &Value::String(caller.short()))?;
        }
        if !keys.message.is_empty() {
            obj.entry(keys.message, &Value::String(record.message.clone()))?;
        }
        for (key, value) in &record.fields {
            obj.entry(key, &self.render_field(value))?;
        }
        if let (false, Some(stack)) = (keys.stacktrace.is_empty(), &record.stacktrace) {
            obj.entry(keys.stacktrace, &Value::String(stack.clone()))?;
        }

        let mut out = obj.finish();
        out.push(b'\n');
        Ok(out)
    }

    /// Tab-separated line; fields follow as a JSON object and the
    /// stacktrace, if any, on the lines below.
    pub fn encode_console(&self, record: &LogRecord) -> Result<Vec<u8>, serde_json::Error> {
        let keys = &self.keys;
        let mut parts: Vec<String> = Vec::with_capacity(6);

        if !keys.time.is_empty() {
            parts.push(self.render_time(&record.timestamp));
        }
        if !keys.severity.is_empty() {
            parts.push(match self.render_severity(record.severity) {
                Value::String(s) => s,
                other => other.to_string(),
            });
        }
        if let (false, Some(name)) = (keys.name.is_empty(), &record.name) {
            parts.push(name.clone());
        }
        if let (false, Some(caller)) = (keys.caller.is_empty(), &record.caller) {
            parts.push(caller.short());
        }
        if !keys.message.is_empty() {
            parts.push(record.message.clone());
        }
        if !record.fields.is_empty() {
            let mut obj = JsonObject::new();
            for (key, value) in &record.fields {
                obj.entry(key, &self.render_field(value))?;
            }
            parts.push(String::from_utf8_lossy(&obj.finish()).into_owned());
        }

        let mut out = parts.join("\t").into_bytes();
        out.push(b'\n');
        if let (false, Some(stack)) = (keys.stacktrace.is_empty(), &record.stacktrace) {
            out.extend_from_slice(stack.trim_end().as_bytes());
            out.push(b'\n');
        }
        Ok(out)
    }

    fn render_severity(&self, severity: Severity) -> Value {
        match self.severity {
            SeverityRenderer::Verbosity => Value::from(severity.to_verbosity()),
            SeverityRenderer::LowercaseName => Value::String(severity.name()),
        }
    }

    fn render_time(&self, ts: &DateTime<Utc>) -> String {
        match self.time {
            TimeRenderer::Rfc3339NanoUtc => ts.to_rfc3339_opts(SecondsFormat::Nanos, true),
            TimeRenderer::Iso8601Local => {
                let local = ts.with_timezone(&Local);
                iso8601(&local.with_timezone(local.offset()))
            }
        }
    }

    fn render_duration(&self, d: &Duration) -> Value {
        match self.duration {
            DurationRenderer::Seconds => Value::from(d.as_secs_f64()),
            DurationRenderer::String => Value::String(format!("{:?}", d)),
        }
    }

    fn render_field(&self, value: &FieldValue) -> Value {
        match value {
            FieldValue::Json(v) => v.clone(),
            FieldValue::Duration(d) => self.render_duration(d),
        }
    }
}

/// Millisecond ISO-8601; a zero offset is written as `Z`.
fn iso8601(ts: &DateTime<FixedOffset>) -> String {
    if ts.offset().local_minus_utc() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string()
    }
}

/// Order-preserving JSON object writer; duplicate keys are written as-is.
struct JsonObject {
    buf: Vec<u8>,
    empty: bool,
}

impl JsonObject {
    fn new() -> Self {
        JsonObject { buf: vec![b'{'], empty: true }
    }

    fn entry(&mut self, key: &str, value: &Value) -> Result<(), serde_json::Error> {
        if !self.empty {
            self.buf.push(b',');
        }
        self.empty = false;
        serde_json::to_writer(&mut self.buf, key)?;
        self.buf.push(b':');
        serde_json::to_writer(&mut self.buf, value)
    }

    fn finish(mut self) -> Vec<u8> {
        self.buf.push(b'}');
        self.buf
    }
}
