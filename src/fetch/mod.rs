//! HTTP fetching for crawl and download traffic.
//!
//! The [`Fetcher`] trait is the only way the traversal engine talks to the
//! network. [`HttpFetcher`] is the reqwest-backed implementation; tests can
//! substitute their own.
//!
//! A [`FetchResult`] carries the terminal status, headers, post-redirect URL
//! and a lazily consumed body stream, so PDF bodies go straight to disk
//! without being buffered in memory.

mod client;
mod error;

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, StreamExt, stream};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use url::Url;

pub use client::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, HttpFetcher};
pub use error::FetchError;

/// Largest HTML page body the engine will buffer for link extraction (16 MiB).
pub const MAX_PAGE_BYTES: usize = 16 * 1024 * 1024;

/// Default number of redirects followed before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Lazily consumed response body.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, FetchError>> + Send>>;

/// Result of a single fetch after all redirects were followed.
pub struct FetchResult {
    /// Terminal HTTP status.
    pub status: StatusCode,
    /// Response headers (case-insensitive keys).
    pub headers: HeaderMap,
    /// URL of the terminal response, after redirects.
    pub final_url: Url,
    /// Response body, not yet read.
    pub body: BodyStream,
}

impl fmt::Debug for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchResult")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("final_url", &self.final_url.as_str())
            .finish_non_exhaustive()
    }
}

impl FetchResult {
    /// Builds a result with an in-memory body.
    #[must_use]
    pub fn from_bytes(
        status: StatusCode,
        headers: HeaderMap,
        final_url: Url,
        body: impl Into<Bytes>,
    ) -> Self {
        let body: Bytes = body.into();
        Self {
            status,
            headers,
            final_url,
            body: Box::pin(stream::once(async move { Ok(body) })),
        }
    }

    /// Returns the Content-Type header value, if present and valid ASCII.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Reads the whole body as text (lossy UTF-8), capped at [`MAX_PAGE_BYTES`].
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the stream fails or the body exceeds the cap.
    pub async fn into_text(self) -> Result<String, FetchError> {
        let url = self.final_url;
        let mut body = self.body;
        let mut buffer: Vec<u8> = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            if buffer.len().saturating_add(chunk.len()) > MAX_PAGE_BYTES {
                return Err(FetchError::body(
                    url.as_str(),
                    format!("page exceeds {MAX_PAGE_BYTES} bytes"),
                ));
            }
            buffer.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Request settings passed to a fetcher at construction.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// User-Agent header value, sent verbatim.
    pub user_agent: String,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (covers body reads).
    pub read_timeout_secs: u64,
    /// Maximum redirects followed per request.
    pub max_redirects: usize,
    /// Extra headers attached to every request.
    pub extra_headers: HeaderMap,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: crate::user_agent::default_user_agent(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            extra_headers: HeaderMap::new(),
        }
    }
}

/// Capability to GET a URL, following redirects.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns the terminal response.
    ///
    /// A terminal 3xx that could not be followed is returned as a result, not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on connection failure, timeout, or a terminal
    /// 4xx/5xx status.
    async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError>;
}
