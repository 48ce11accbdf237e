//! Environment-based configuration.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use super::{LogFormat, MaddoxConfig};
use crate::error::ConfigError;

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "MADDOX";

/// Environment variable reader.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Prefix for environment variables.
    prefix: String,
    /// Fixed variables used instead of the process environment.
    fixed: Option<HashMap<String, String>>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a reader over the process environment.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            fixed: None,
        }
    }

    /// Create a reader over a fixed set of variables.
    ///
    /// Keys are full variable names, prefix included.
    pub fn from_pairs<K, V>(prefix: impl Into<String>, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            fixed: Some(
                pairs
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        match &self.fixed {
            Some(vars) => vars.get(&var_name).cloned(),
            None => std::env::var(&var_name).ok(),
        }
    }

    /// Get a string value with default.
    #[must_use]
    pub fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    /// Get a parsed value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the variable is set but
    /// does not parse.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        let Some(raw) = self.get(name) else {
            return Ok(None);
        };
        raw.trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: self.var_name(name),
                value: raw,
            })
    }

    /// Get a duration in milliseconds.
    ///
    /// # Errors
    ///
    /// See [`EnvConfig::parse`].
    pub fn duration_millis(&self, name: &str) -> Result<Option<Duration>, ConfigError> {
        Ok(self.parse::<u64>(name)?.map(Duration::from_millis))
    }

    /// Apply every recognised override to `config`.
    ///
    /// Recognised names (with the prefix): `TIMEOUT_MS`,
    /// `TRUNCATE_THRESHOLD`, `LOG_LEVEL`, `LOG_FORMAT`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first unusable value.
    pub fn apply(&self, mut config: MaddoxConfig) -> Result<MaddoxConfig, ConfigError> {
        if let Some(timeout) = self.duration_millis("TIMEOUT_MS")? {
            config = config.timeout(timeout);
        }
        if let Some(threshold) = self.parse::<usize>("TRUNCATE_THRESHOLD")? {
            config.truncate_threshold = threshold;
        }
        if let Some(level) = self.get("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(format) = self.get("LOG_FORMAT") {
            config.logging.format = format.parse::<LogFormat>().map_err(|_| {
                ConfigError::InvalidValue {
                    key: self.var_name("LOG_FORMAT"),
                    value: format,
                }
            })?;
        }
        debug!(prefix = %self.prefix, "applied environment overrides");
        Ok(config)
    }
}
