//! File-based configuration loading.
//!
//! ```toml
//! timeout_ms = 5000
//! truncate_threshold = 40
//!
//! [logging]
//! level = "maddox=debug"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use super::MaddoxConfig;
use crate::error::ConfigError;

/// Load a configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read and
/// [`ConfigError::Parse`] when it is not a valid configuration.
pub fn load(path: impl AsRef<Path>) -> Result<MaddoxConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&content, path)?;
    debug!(path = %path.display(), "loaded configuration file");
    Ok(config)
}

/// Parse configuration text. `origin` is only used in error reports.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when `content` is not a valid configuration.
pub fn parse(content: &str, origin: impl Into<PathBuf>) -> Result<MaddoxConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: origin.into(),
        source,
    })
}

impl MaddoxConfig {
    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// See [`load`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load(path)
    }
}
