//! Log output setup.
//!
//! Library code logs through the `log` facade. [`init_logging`] routes those
//! records into a `tracing` subscriber that writes to stderr.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::error::BatchflowError;

/// Output format for [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter` (e.g. `"batchflow=info"`).
/// Fails if a global logger or subscriber is already installed.
pub fn init_logging(default_filter: &str, format: LogFormat) -> Result<(), BatchflowError> {
    tracing_log::LogTracer::init().map_err(|e| BatchflowError::Logging(e.to_string()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| BatchflowError::Logging(e.to_string()))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().with_writer(std::io::stderr).with_target(true)),
        ),
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().with_writer(std::io::stderr)),
        ),
    };

    result.map_err(|e| BatchflowError::Logging(e.to_string()))
}
