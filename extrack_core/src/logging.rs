//! Tracing setup for the extrack server and CLI.
//!
//! Events always go to stderr; the offline commands print their JSON on
//! stdout. `RUST_LOG`, when set, replaces the configured level.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber described by `config`
pub fn init(config: &LoggingConfig) {
    let (compact, json) = match config.format {
        LogFormat::Compact => (
            Some(fmt::layer().compact().with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(compact)
        .with(json)
        .init();
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
