//! Error types for ciwatch-core

use thiserror::Error;

/// Result type for watcher operations
pub type WatchResult<T> = std::result::Result<T, WatchError>;

/// Errors that can occur while querying the CircleCI API.
///
/// All variants are fatal: the watcher does not retry a failed query,
/// it surfaces the error and lets the process exit non-zero. Build
/// not found, build failed, and budget exhaustion are not errors —
/// they are ordinary [`WatchOutcome`](crate::watcher::WatchOutcome)s.
#[derive(Error, Debug)]
pub enum WatchError {
    /// Transport-level failure (DNS, connect, TLS, timeout)
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The API answered with a non-2xx status
    #[error("CircleCI API returned HTTP {status} for {endpoint}")]
    Api { status: u16, endpoint: &'static str },

    /// Response body did not decode as the expected JSON shape
    #[error("Failed to decode CircleCI response: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration rejected before any request was made
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for WatchError {
    fn from(err: reqwest::Error) -> Self {
        WatchError::Http(err.to_string())
    }
}
