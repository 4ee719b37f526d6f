//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem for structured logging with support for
//! both human-readable and JSON output formats.

use scribe_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem from configuration.
///
/// The RUST_LOG environment variable overrides the configured level.
pub fn init_from_config(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.format == "json" {
        // JSON format for machine parsing
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        // Pretty format for humans
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}
