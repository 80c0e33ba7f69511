//! Error types for the fetch module.

use thiserror::Error;

/// Errors that can occur while fetching a URL.
///
/// Every variant is a per-URL network failure: the traversal engine records
/// it against the task and moves on to the rest of the queue.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS, redirect loop, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// Request or body read timed out.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Terminal HTTP error response (4xx, 5xx) after following redirects.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Response body was not valid text when an HTML page was expected.
    #[error("could not read body of {url}: {reason}")]
    Body {
        /// The URL whose body could not be read.
        url: String,
        /// Description of the decoding failure.
        reason: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a body decoding error.
    pub fn body(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Body {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for timeouts.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
