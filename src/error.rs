//! Error types for request fetching and configuration loading.

use thiserror::Error;

/// Errors surfaced by the fetch wrapper and the offline resource fetcher.
///
/// `RequestFailed` and `DecodeFailed` always propagate to the caller.
/// `NetworkUnavailable` is swallowed by the fetch wrapper when a previously
/// cached value (possibly expired) exists for the same key, in which case the
/// stale value is returned instead.
#[derive(Error, Debug, Clone)]
pub enum FetchError {
    /// Non-2xx HTTP response; carries the server-supplied message when the
    /// error body was parseable.
    #[error("request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    /// Fetch-level rejection (offline, DNS failure, connection refused).
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Response body is not valid JSON where JSON was expected.
    #[error("response is not valid JSON: {0}")]
    DecodeFailed(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::NetworkUnavailable(err.to_string())
    }
}

/// Errors from loading or validating the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
