// Logging module for structured logging using the tracing crate

use std::error::Error;

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for structured logging.
///
/// The filter is taken from `RUST_LOG` when set, defaulting to `info`.
/// Output is human-readable; use [`init_json_subscriber`] for log
/// aggregation pipelines.
///
/// Returns an error if a global subscriber is already installed.
pub fn init_subscriber() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| e as Box<dyn Error>)?;

    Ok(())
}

/// Initialize the tracing subscriber with JSON formatting.
pub fn init_json_subscriber() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| e as Box<dyn Error>)?;

    Ok(())
}
