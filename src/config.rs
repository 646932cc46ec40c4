use std::io;
use std::sync::Arc;

use crate::encoder::{EncoderConfig, Encoding, Mode};
use crate::logger::Logger;
use crate::severity::Severity;
use crate::sink::{Destination, LogSink};

/// Everything needed to build a [`Logger`].
///
/// Usually obtained from [`LoggerConfig::development`] or
/// [`LoggerConfig::production`]; the fields are public so callers can
/// point the output somewhere else before building.
///
/// **Fields**
/// - `threshold`: records below this severity are dropped.
/// - `encoding`: console text or JSON.
/// - `encoder`: field keys and renderers, see [`EncoderConfig`].
/// - `stacktrace_threshold`: records at or above this severity carry a
///   captured backtrace.
/// - `output`: where records go.
/// - `error_output`: where the logger reports its own I/O failures.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub threshold: Severity,
    pub development: bool,
    pub encoding: Encoding,
    pub encoder: EncoderConfig,
    pub stacktrace_threshold: Severity,
    pub output: Destination,
    pub error_output: Destination,
}

/// Error type returned when building a logger from configuration.
#[derive(thiserror::Error, Debug)]
pub enum BuildError {
    #[error("failed to open log destination {destination:?}: {source}")]
    Open {
        destination: Destination,
        #[source]
        source: io::Error,
    },
}

impl LoggerConfig {
    /// Console output with short keys; stacktraces from WARNING up.
    pub fn development(threshold: Severity) -> Self {
        Self::for_mode(Mode::Development, threshold)
    }

    /// JSON output with long keys; stacktraces from ERROR up.
    pub fn production(threshold: Severity) -> Self {
        Self::for_mode(Mode::Production, threshold)
    }

    pub fn for_mode(mode: Mode, threshold: Severity) -> Self {
        LoggerConfig {
            threshold,
            development: mode == Mode::Development,
            encoding: mode.encoding(),
            encoder: *EncoderConfig::for_mode(mode),
            stacktrace_threshold: match mode {
                Mode::Development => Severity::WARNING,
                Mode::Production => Severity::ERROR,
            },
            output: Destination::Stderr,
            error_output: Destination::Stderr,
        }
    }

    pub fn with_output(mut self, output: Destination) -> Self {
        self.output = output;
        self
    }

    pub fn with_error_output(mut self, error_output: Destination) -> Self {
        self.error_output = error_output;
        self
    }

    /// Open both destinations and build the logger.
    pub fn build(&self) -> Result<Logger, BuildError> {
        let sink = open(&self.output)?;
        let error_sink = open(&self.error_output)?;
        Ok(Logger::from_config(self, sink, error_sink))
    }

    /// Build on top of an already-open sink; both records and I/O failure
    /// reports go to it.
    pub fn build_with_sink(&self, sink: Arc<dyn LogSink>) -> Logger {
        Logger::from_config(self, Arc::clone(&sink), sink)
    }

    /// Like [`LoggerConfig::build`], but a failed build yields
    /// [`Logger::example`] instead of an error.
    pub fn build_or_example(&self) -> Logger {
        match self.build() {
            Ok(logger) => logger,
            Err(err) => {
                tracing::debug!(error = %err, "logger build failed, falling back to example logger");
                Logger::example()
            }
        }
    }
}

fn open(destination: &Destination) -> Result<Arc<dyn LogSink>, BuildError> {
    destination.open().map_err(|source| BuildError::Open {
        destination: destination.clone(),
        source,
    })
}
