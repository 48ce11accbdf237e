//! Log subscriber setup.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the test binary. [`init_logging`] is a convenience for doing so from a
//! [`LoggingConfig`], and is safe to call from every test.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::config::{LogFormat, LoggingConfig};

/// Install a global `fmt` subscriber for `config`.
///
/// `RUST_LOG`, when set, takes precedence over `config.level`. Returns
/// `false` when a global subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter).with_test_writer().with_target(true);
    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_refused() {
        let config = LoggingConfig::new().level("maddox=debug");
        // Another test may already have installed one.
        let _ = init_logging(&config);
        assert!(!init_logging(&config));
    }
}
