//! Logging utilities for the Roomify application.
//!
//! This module provides a standardized approach to logging across all crates
//! in the Roomify application. It includes functions for initializing the
//! tracing subscriber.

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// This function should be called at the start of the application to set up
/// logging. It configures the tracing subscriber with the specified log level
/// and formats log messages with timestamps, log levels, targets, and
/// file/line information.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// `RUST_LOG` still takes precedence via `EnvFilter::from_default_env`; the
/// level argument only sets the default for the `roomify` crates.
pub fn init_with_level(level: Level) {
    let filter =
        EnvFilter::from_default_env().add_directive(format!("roomify={}", level).parse().unwrap());

    // Use try_init to handle the case where a global default subscriber has
    // already been set (tests initialize logging more than once).
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}
