//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LogFormat};

/// Initialize tracing for the process. Events go to stderr so they never
/// interleave with console output on stdout.
///
/// `RUST_LOG` takes precedence over the configured filter. Safe to call
/// multiple times (subsequent calls are no-ops).
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match config.format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .try_init(),
        LogFormat::Pretty => builder.compact().try_init(),
    };
}
