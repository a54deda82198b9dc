//! Process-wide logging setup.
//!
//! Library code logs through the `log` facade and opens `tracing` spans
//! around backend calls. Binaries call [`init_logging`] once to route both
//! into a single `tracing-subscriber` pipeline on stderr.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::error::{Result, TryOnError};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Installs the global subscriber and bridges `log` records into it.
///
/// `RUST_LOG` takes precedence over `default_filter`. With `json` set, each
/// event is written as one JSON object per line.
pub fn init_logging(default_filter: &str, json: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| TryOnError::Logging(format!("invalid filter '{}': {}", default_filter, e)))?,
    };

    let (plain, structured) = if json {
        let layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr);
        (None, Some(layer))
    } else {
        let layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
        (Some(layer), None)
    };

    let subscriber = Registry::default().with(filter).with(plain).with(structured);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| TryOnError::Logging(e.to_string()))?;
    tracing_log::LogTracer::init().map_err(|e| TryOnError::Logging(e.to_string()))?;

    log::debug!("Logging initialized");
    Ok(())
}
