use std::fmt;

/// Position on the internal, ascending severity scale.
///
/// Larger values are more important. Two external representations are
/// mapped onto it:
///
/// - **verbosity**: a non-negative integer where higher means *more*
///   verbose. It is negated on the way in and on the way out, so the
///   mapping is its own inverse. The scale is wider than `i32` so that
///   negating any verbosity keeps its order.
/// - **named levels**: the closed set in [`NamedLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Severity(i64);

impl Severity {
    pub const DEBUG: Severity = Severity(-1);
    pub const INFO: Severity = Severity(0);
    pub const WARNING: Severity = Severity(1);
    pub const ERROR: Severity = Severity(2);
    pub const CRITICAL: Severity = Severity(3);
    pub const ALERT: Severity = Severity(4);
    pub const EMERGENCY: Severity = Severity(5);

    /// Wrap a raw internal level.
    pub const fn new(level: i64) -> Self {
        Severity(level)
    }

    /// Raw internal level.
    pub const fn level(self) -> i64 {
        self.0
    }

    /// Map a verbosity onto the internal scale (`-v`).
    pub const fn from_verbosity(verbosity: i32) -> Self {
        Severity(-(verbosity as i64))
    }

    /// Inverse of [`Severity::from_verbosity`]; used when rendering records.
    ///
    /// Levels that no verbosity maps to saturate at the `i32` bounds.
    pub fn to_verbosity(self) -> i32 {
        let negated = self.0.saturating_neg();
        i32::try_from(negated).unwrap_or(if negated < 0 { i32::MIN } else { i32::MAX })
    }

    /// Map a level name onto the internal scale.
    ///
    /// Matching ignores case and surrounding whitespace. Anything that is
    /// not in the table (including the empty string) maps to INFO.
    pub fn from_level_name(name: &str) -> Self {
        NamedLevel::parse_lenient(name).into()
    }

    /// Lowercase label used by encoders that render names instead of
    /// verbosity numbers.
    pub fn name(self) -> String {
        match NamedLevel::from_severity(self) {
            Some(named) => named.as_str().to_ascii_lowercase(),
            None => format!("level({})", self.0),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Severity(-2),
            tracing::Level::DEBUG => Severity::DEBUG,
            tracing::Level::INFO => Severity::INFO,
            tracing::Level::WARN => Severity::WARNING,
            tracing::Level::ERROR => Severity::ERROR,
        }
    }
}

/// Named severity levels, least to most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NamedLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl NamedLevel {
    pub const ALL: [NamedLevel; 7] = [
        NamedLevel::Debug,
        NamedLevel::Info,
        NamedLevel::Warning,
        NamedLevel::Error,
        NamedLevel::Critical,
        NamedLevel::Alert,
        NamedLevel::Emergency,
    ];

    /// Canonical upper-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            NamedLevel::Debug => "DEBUG",
            NamedLevel::Info => "INFO",
            NamedLevel::Warning => "WARNING",
            NamedLevel::Error => "ERROR",
            NamedLevel::Critical => "CRITICAL",
            NamedLevel::Alert => "ALERT",
            NamedLevel::Emergency => "EMERGENCY",
        }
    }

    /// Parse a level name, falling back to [`NamedLevel::Info`] on no match.
    pub fn parse_lenient(name: &str) -> Self {
        let canonical = name.trim().to_ascii_uppercase();
        NamedLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == canonical)
            .unwrap_or(NamedLevel::Info)
    }

    fn from_severity(severity: Severity) -> Option<Self> {
        NamedLevel::ALL
            .into_iter()
            .find(|level| Severity::from(*level) == severity)
    }
}

impl From<NamedLevel> for Severity {
    fn from(level: NamedLevel) -> Self {
        match level {
            NamedLevel::Debug => Severity::DEBUG,
            NamedLevel::Info => Severity::INFO,
            NamedLevel::Warning => Severity::WARNING,
            NamedLevel::Error => Severity::ERROR,
            NamedLevel::Critical => Severity::CRITICAL,
            NamedLevel::Alert => Severity::ALERT,
            NamedLevel::Emergency => Severity::EMERGENCY,
        }
    }
}

impl fmt::Display for NamedLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
