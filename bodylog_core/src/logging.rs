//! Tracing setup for the `bodylog` binary.
//!
//! Output goes to stderr so it never mixes with the menu on stdout.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber at WARN, or whatever `RUST_LOG` says
pub fn init() {
    init_with_level("warn")
}

/// Install the global subscriber with `default_level` as the fallback
/// filter when `RUST_LOG` is unset. `--verbose` passes `"debug"`.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
