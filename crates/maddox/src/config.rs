//! Configuration for scenario execution.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use maddox::config::{LogFormat, LoggingConfig, MaddoxConfig};
//!
//! let config = MaddoxConfig::new()
//!     .timeout(Duration::from_secs(2))
//!     .truncate_threshold(60)
//!     .logging(LoggingConfig::new().level("debug").format(LogFormat::Compact));
//!
//! assert_eq!(config.timeout_duration(), Duration::from_secs(2));
//! ```

pub mod env;
pub mod file;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use env::EnvConfig;

use crate::compare::DEFAULT_TRUNCATE_THRESHOLD;
use crate::error::ConfigError;

/// Default scenario timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings that shape how scenarios run and report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaddoxConfig {
    /// Upper bound on one scenario's execution, in milliseconds.
    pub timeout_ms: u64,
    /// Rendering length at which compound values are summarised in diffs.
    pub truncate_threshold: usize,
    /// Logging setup used by [`crate::logging::init_logging`].
    pub logging: LoggingConfig,
}

impl Default for MaddoxConfig {
    fn default() -> Self {
        Self {
            timeout_ms: duration_millis(DEFAULT_TIMEOUT),
            truncate_threshold: DEFAULT_TRUNCATE_THRESHOLD,
            logging: LoggingConfig::default(),
        }
    }
}

impl MaddoxConfig {
    /// Create a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scenario timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = duration_millis(timeout);
        self
    }

    /// Set the truncation threshold.
    #[must_use]
    pub const fn truncate_threshold(mut self, threshold: usize) -> Self {
        self.truncate_threshold = threshold;
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// The scenario timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout_duration(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load from the file named by `MADDOX_CONFIG` (if any), then apply
    /// `MADDOX_*` overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when the named file cannot be read or parsed, or an
    /// override has an unusable value.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&EnvConfig::default())
    }

    /// As [`MaddoxConfig::load`], reading variables through `env`.
    ///
    /// # Errors
    ///
    /// See [`MaddoxConfig::load`].
    pub fn load_from(env: &EnvConfig) -> Result<Self, ConfigError> {
        let base = match env.get("CONFIG") {
            Some(path) => file::load(path)?,
            None => Self::default(),
        };
        env.apply(base)
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Configuration for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `"info"` or `"maddox=debug"`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter directive.
    #[must_use]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the log format.
    #[must_use]
    pub const fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}

/// Log format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human oriented.
    Pretty,
    /// Single-line text.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "log format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}
