//! Global tracing subscriber setup.

use std::io;

use relay_core::{LogFormat, LoggingConfig};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Error type for logging setup.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    #[error("logger already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Parse a configured level such as `info` or `debug`.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    level
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| LoggingError::InvalidLevel(level.to_string()))
}

/// Install the global subscriber.
///
/// The configured level is the default directive; `RUST_LOG` overrides it.
/// Output goes to stderr so command output on stdout stays clean.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let level = parse_level(&config.level)?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Human => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init(),
    };
    result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::debug!(level = %level, format = ?config.format, "logger initialized");
    Ok(())
}
