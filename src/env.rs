//! Environment-driven logger construction.
//!
//! Environment access goes through a plain lookup function so the parsing
//! rules can be exercised without touching the process environment.

use crate::config::LoggerConfig;
use crate::encoder::Mode;
use crate::logger::{logger_config, new_logger, Logger};

/// Selects the preset: `development` (any case, surrounding whitespace
/// ignored) for console output, anything else for JSON.
pub const LOG_MODE_ENV: &str = "LOG_MODE";

/// Integer verbosity; higher is more verbose.
pub const LOG_VERBOSITY_ENV: &str = "LOG_VERBOSITY";

/// Verbosity used when `LOG_VERBOSITY` is unset or not an integer.
pub const DEFAULT_VERBOSITY: i32 = 1;

/// Logger settings resolved from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvSettings {
    pub verbosity: i32,
    pub mode: Mode,
}

impl Default for EnvSettings {
    fn default() -> Self {
        EnvSettings {
            verbosity: DEFAULT_VERBOSITY,
            mode: Mode::Production,
        }
    }
}

impl EnvSettings {
    /// Resolve settings through `lookup`. Malformed or missing values fall
    /// back to the defaults; nothing here fails.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let verbosity = lookup(LOG_VERBOSITY_ENV)
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .unwrap_or(DEFAULT_VERBOSITY);

        let development = lookup(LOG_MODE_ENV)
            .map(|raw| raw.trim().to_lowercase() == "development")
            .unwrap_or(false);

        EnvSettings {
            verbosity,
            mode: Mode::from_development_flag(development),
        }
    }

    /// Resolve settings from the process environment.
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    pub fn development(&self) -> bool {
        self.mode == Mode::Development
    }

    /// Configuration the settings build from.
    pub fn config(&self) -> LoggerConfig {
        logger_config(self.verbosity, self.development())
    }

    pub fn build(&self) -> Logger {
        new_logger(self.verbosity, self.development())
    }
}

/// Build a logger from `LOG_VERBOSITY` and `LOG_MODE`.
pub fn new_logger_from_env() -> Logger {
    EnvSettings::from_env().build()
}
