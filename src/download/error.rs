//! Error types for the download module.

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while writing a PDF body to disk.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// File system error (create, write, flush).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The body stream failed part-way through.
    #[error("body stream failed for {path}: {source}")]
    Stream {
        /// The partially written path (removed before returning).
        path: PathBuf,
        /// The underlying fetch error.
        #[source]
        source: FetchError,
    },
}

impl DownloadError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a stream error.
    pub fn stream(path: impl Into<PathBuf>, source: FetchError) -> Self {
        Self::Stream {
            path: path.into(),
            source,
        }
    }
}

// No From<std::io::Error> / From<FetchError>: every variant needs the path.
