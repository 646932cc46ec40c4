use chrono::Utc;
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crate::config::LoggerConfig;
use crate::encoder::{EncoderConfig, Encoding, Mode, EXAMPLE_ENCODER};
use crate::noop_sink::NoopSink;
use crate::record::{Caller, FieldValue, LogRecord};
use crate::severity::Severity;
use crate::sink::{LogSink, StderrSink, StdoutSink};

/// Build a logger for the given verbosity and mode.
///
/// **Parameters**
/// - `verbosity`: records more verbose than this are dropped; mapped onto
///   the severity scale with [`Severity::from_verbosity`].
/// - `development`: console output with short keys when `true`, JSON
///   with long keys otherwise.
///
/// **Behavior**
///
/// Output goes to standard error. If the logger cannot be built, the
/// minimal [`Logger::example`] is returned instead; this function never
/// fails.
pub fn new_logger(verbosity: i32, development: bool) -> Logger {
    logger_config(verbosity, development).build_or_example()
}

/// Configuration [`new_logger`] builds from.
pub(crate) fn logger_config(verbosity: i32, development: bool) -> LoggerConfig {
    let mode = Mode::from_development_flag(development);
    LoggerConfig::for_mode(mode, Severity::from_verbosity(verbosity))
}

struct Core {
    /// `None` disables every record.
    threshold: Option<Severity>,
    encoding: Encoding,
    encoder: EncoderConfig,
    stacktrace_threshold: Option<Severity>,
    sink: Arc<dyn LogSink>,
    error_sink: Arc<dyn LogSink>,
}

/// Handle for emitting structured records.
///
/// Cloning is cheap and clones share the underlying sink. Derived loggers
/// ([`Logger::v`], [`Logger::with_name`], [`Logger::with_values`]) share it
/// too but are distinct instances for [`Logger::ptr_eq`].
#[derive(Clone)]
pub struct Logger {
    core: Arc<Core>,
    name: Option<Arc<str>>,
    verbosity: i32,
    values: Arc<[(String, FieldValue)]>,
}

impl Logger {
    pub(crate) fn from_config(
        config: &LoggerConfig,
        sink: Arc<dyn LogSink>,
        error_sink: Arc<dyn LogSink>,
    ) -> Self {
        Self::from_core(Core {
            threshold: Some(config.threshold),
            encoding: config.encoding,
            encoder: config.encoder,
            stacktrace_threshold: Some(config.stacktrace_threshold),
            sink,
            error_sink,
        })
    }

    fn from_core(core: Core) -> Self {
        Logger {
            core: Arc::new(core),
            name: None,
            verbosity: 0,
            values: Arc::from(Vec::new()),
        }
    }

    /// Minimal logger used when a configured build fails: JSON on
    /// standard output from DEBUG up, no time or caller.
    pub fn example() -> Self {
        Self::from_core(Core {
            threshold: Some(Severity::DEBUG),
            encoding: Encoding::Json,
            encoder: EXAMPLE_ENCODER,
            stacktrace_threshold: None,
            sink: Arc::new(StdoutSink),
            error_sink: Arc::new(StderrSink),
        })
    }

    /// Logger that drops everything.
    pub fn discard() -> Self {
        Self::from_core(Core {
            threshold: None,
            encoding: Encoding::Json,
            encoder: EXAMPLE_ENCODER,
            stacktrace_threshold: None,
            sink: Arc::new(NoopSink),
            error_sink: Arc::new(NoopSink),
        })
    }

    /// `true` if both handles are the same instance (or clones of it).
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
            && Arc::ptr_eq(&self.values, &other.values)
            && self.name == other.name
            && self.verbosity == other.verbosity
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Accumulated verbosity of this handle.
    pub fn verbosity(&self) -> i32 {
        self.verbosity
    }

    /// Severity at which [`Logger::info`] emits.
    pub fn info_severity(&self) -> Severity {
        Severity::from_verbosity(self.verbosity)
    }

    /// Whether [`Logger::info`] on this handle would emit anything.
    pub fn enabled(&self) -> bool {
        self.enabled_at(self.info_severity())
    }

    pub fn enabled_at(&self, severity: Severity) -> bool {
        self.core.threshold.is_some_and(|threshold| severity >= threshold)
    }

    /// A more verbose child: `v(1).v(2)` is the same as `v(3)`.
    pub fn v(&self, level: u32) -> Logger {
        let level = i32::try_from(level).unwrap_or(i32::MAX);
        Logger {
            verbosity: self.verbosity.saturating_add(level),
            ..self.clone()
        }
    }

    /// A named child. Names nest with dots: `a` then `b` gives `a.b`.
    pub fn with_name(&self, name: &str) -> Logger {
        let name: Arc<str> = match &self.name {
            Some(parent) => format!("{}.{}", parent, name).into(),
            None => name.into(),
        };
        Logger {
            name: Some(name),
            ..self.clone()
        }
    }

    /// A child that adds `fields` to every record it emits.
    pub fn with_values(&self, fields: &[(&str, FieldValue)]) -> Logger {
        let values: Vec<(String, FieldValue)> = self
            .values
            .iter()
            .cloned()
            .chain(fields.iter().map(|(k, v)| (k.to_string(), v.clone())))
            .collect();
        Logger {
            values: values.into(),
            ..self.clone()
        }
    }

    /// Emit a non-error message at this handle's verbosity.
    #[track_caller]
    pub fn info(&self, message: &str, fields: &[(&str, FieldValue)]) {
        self.emit(self.info_severity(), message, None, fields, Location::caller());
    }

    /// Emit an error at [`Severity::ERROR`], regardless of verbosity. The
    /// error's display text is added under the `error` key.
    #[track_caller]
    pub fn error(&self, err: &dyn Error, message: &str, fields: &[(&str, FieldValue)]) {
        self.emit(Severity::ERROR, message, Some(err), fields, Location::caller());
    }

    /// Emit at an explicit severity, e.g. one built from a level name.
    #[track_caller]
    pub fn log(&self, severity: Severity, message: &str, fields: &[(&str, FieldValue)]) {
        self.emit(severity, message, None, fields, Location::caller());
    }

    fn emit(
        &self,
        severity: Severity,
        message: &str,
        err: Option<&dyn Error>,
        fields: &[(&str, FieldValue)],
        location: &Location<'_>,
    ) {
        if !self.enabled_at(severity) {
            return;
        }
        let mut record = LogRecord::new(severity, message);
        record.caller = Some(Caller::from_location(location));
        if let Some(err) = err {
            record.fields.push(("error".to_string(), FieldValue::from(err.to_string())));
        }
        record
            .fields
            .extend(fields.iter().map(|(k, v)| (k.to_string(), v.clone())));
        self.write_record(record);
    }

    /// Encode and write a prepared record.
    ///
    /// The record is dropped if its severity is below the threshold. The
    /// handle's name and bound values are applied, and a backtrace is
    /// captured when the severity calls for one. Failures are reported on
    /// the error output, never returned.
    pub fn write_record(&self, mut record: LogRecord) {
        let core = &self.core;
        if !self.enabled_at(record.severity) {
            return;
        }
        if record.name.is_none() {
            record.name = self.name.as_deref().map(str::to_string);
        }
        if !self.values.is_empty() {
            let mut fields = self.values.to_vec();
            fields.append(&mut record.fields);
            record.fields = fields;
        }
        if core.stacktrace_threshold.is_some_and(|t| record.severity >= t) {
            record.stacktrace = Some(Backtrace::force_capture().to_string());
        }

        let line = match core.encoder.encode(core.encoding, &record) {
            Ok(line) => line,
            Err(err) => return self.report("encode error", &err),
        };
        if let Err(err) = core.sink.write_line(&line) {
            self.report("write error", &err);
        }
    }

    /// Flush the sink; a failure is reported on the error output.
    pub fn flush(&self) {
        if let Err(err) = self.core.sink.flush() {
            self.report("flush error", &err);
        }
    }

    fn report(&self, what: &str, err: &dyn fmt::Display) {
        let line = format!("{} {}: {}\n", Utc::now().to_rfc3339(), what, err);
        // Nowhere left to report a failing error output.
        let _ = self.core.error_sink.write_line(line.as_bytes());
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("verbosity", &self.verbosity)
            .field("threshold", &self.core.threshold)
            .field("encoding", &self.core.encoding)
            .field("values", &self.values.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{DEVELOPMENT_ENCODER, PRODUCTION_ENCODER};
    use crate::sink::MemorySink;
    use serde_json::Value;
    use std::io;

    fn json_logger(verbosity: i32) -> (Logger, MemorySink) {
        let sink = MemorySink::new();
        let logger = LoggerConfig::production(Severity::from_verbosity(verbosity))
            .build_with_sink(Arc::new(sink.clone()));
        (logger, sink)
    }

    fn parsed(sink: &MemorySink) -> Vec<Value> {
        sink.lines()
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn new_logger_never_fails() {
        let logger = new_logger(1, false);
        assert!(logger.enabled());
        assert!(logger.v(1).enabled());
        assert!(!logger.v(2).enabled());
        let dev = new_logger(0, true);
        assert!(!dev.v(1).enabled());
    }

    #[test]
    fn least_verbose_setting_enables_nothing() {
        let logger = new_logger(i32::MIN, false);
        assert!(!logger.enabled());
        assert!(!logger.v(100).enabled());
        assert!(!logger.enabled_at(Severity::EMERGENCY));
    }

    #[test]
    fn most_verbose_setting_enables_deep_levels() {
        let logger = new_logger(i32::MAX, false);
        assert!(logger.v(u32::MAX).enabled());
    }

    #[test]
    fn factory_picks_preset_from_development_flag() {
        let dev = logger_config(1, true);
        assert_eq!(dev.encoding, Encoding::Console);
        assert_eq!(dev.encoder, DEVELOPMENT_ENCODER);
        assert_eq!(dev.threshold, Severity::from_verbosity(1));

        let prod = logger_config(1, false);
        assert_eq!(prod.encoding, Encoding::Json);
        assert_eq!(prod.encoder, PRODUCTION_ENCODER);
    }

    #[test]
    fn info_renders_verbosity_and_caller() {
        let (logger, sink) = json_logger(2);
        logger.v(2).info("deep detail", &[("attempt", 3.into())]);
        let records = parsed(&sink);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["verbosity"], 2);
        assert_eq!(records[0]["message"], "deep detail");
        assert_eq!(records[0]["attempt"], 3);
        assert!(records[0]["caller"].as_str().unwrap().starts_with("src/logger.rs:"));
        assert!(records[0]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn threshold_drops_more_verbose_records() {
        let (logger, sink) = json_logger(1);
        logger.info("v0", &[]);
        logger.v(1).info("v1", &[]);
        logger.v(1).v(1).info("v2", &[]);
        let messages: Vec<Value> = parsed(&sink).into_iter().map(|r| r["message"].clone()).collect();
        assert_eq!(messages, vec![Value::from("v0"), Value::from("v1")]);
    }

    #[test]
    fn errors_ignore_verbosity_and_carry_stacktrace() {
        let (logger, sink) = json_logger(0);
        let err = io::Error::new(io::ErrorKind::Other, "disk on fire");
        logger.v(5).error(&err, "write failed", &[("path", "/tmp/x".into())]);
        let records = parsed(&sink);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["verbosity"], -2);
        assert_eq!(records[0]["error"], "disk on fire");
        assert_eq!(records[0]["path"], "/tmp/x");
        assert!(records[0]["stacktrace"].is_string());
    }

    #[test]
    fn names_nest_with_dots() {
        let (logger, sink) = json_logger(0);
        let child = logger.with_name("http").with_name("router");
        assert_eq!(child.name(), Some("http.router"));
        child.info("routed", &[]);
        assert_eq!(parsed(&sink)[0]["logger"], "http.router");
    }

    #[test]
    fn bound_values_come_first() {
        let (logger, sink) = json_logger(0);
        let scoped = logger.with_values(&[("request_id", "r-1".into())]);
        scoped.info("handled", &[("status", 200.into())]);
        let line = sink.lines().remove(0);
        let request_at = line.find("request_id").unwrap();
        let status_at = line.find("status").unwrap();
        assert!(request_at < status_at);
        logger.info("unscoped", &[]);
        assert!(parsed(&sink)[1].get("request_id").is_none());
    }

    #[test]
    fn explicit_severity_from_level_name() {
        let (logger, sink) = json_logger(0);
        logger.log(Severity::from_level_name("warning"), "careful", &[]);
        logger.log(Severity::from_level_name("debug"), "hidden", &[]);
        let records = parsed(&sink);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["verbosity"], -1);
    }

    #[test]
    fn discard_is_never_enabled() {
        let logger = Logger::discard();
        assert!(!logger.enabled());
        assert!(!logger.enabled_at(Severity::new(i64::MAX)));
        logger.info("nothing", &[]);
    }

    #[test]
    fn example_logger_starts_at_debug() {
        let logger = Logger::example();
        assert!(logger.enabled());
        assert!(logger.v(1).enabled());
        assert!(!logger.v(2).enabled());
    }

    #[test]
    fn clones_share_identity_and_children_do_not() {
        let (logger, _sink) = json_logger(0);
        let clone = logger.clone();
        assert!(logger.ptr_eq(&clone));
        assert!(!logger.ptr_eq(&logger.v(1)));
        assert!(!logger.ptr_eq(&logger.with_name("x")));
        assert!(!logger.ptr_eq(&logger.with_values(&[])));
    }

    struct FailingSink;

    impl LogSink for FailingSink {
        fn write_line(&self, _line: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn write_failures_go_to_error_output() {
        let errors = MemorySink::new();
        let logger = Logger::from_config(
            &LoggerConfig::production(Severity::INFO),
            Arc::new(FailingSink),
            Arc::new(errors.clone()),
        );
        logger.info("lost", &[]);
        let lines = errors.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("write error: closed"));
    }

    #[test]
    fn development_logger_writes_console_lines() {
        let sink = MemorySink::new();
        let logger = LoggerConfig::development(Severity::from_verbosity(1))
            .build_with_sink(Arc::new(sink.clone()));
        logger.v(1).info("booting", &[("port", 8080.into())]);
        let line = sink.lines().remove(0);
        let parts: Vec<&str> = line.split('\t').collect();
        assert_eq!(parts[1], "1");
        assert_eq!(parts[3], "booting");
        assert_eq!(parts[4], "{\"port\":8080}");
    }
}
