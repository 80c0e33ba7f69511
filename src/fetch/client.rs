//! reqwest-backed [`Fetcher`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, instrument};
use url::Url;

use super::{FetchError, FetchResult, Fetcher, FetcherConfig};

/// Default HTTP connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default whole-request timeout (5 minutes, covers large PDF bodies).
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;

/// HTTP fetcher with a shared connection pool and cookie store.
///
/// Create once per run; all requests share the same session, so cookies an
/// OJS site sets on a landing page are sent with the galley download.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns the reqwest builder error when the TLS backend or headers
    /// cannot be initialised.
    #[instrument(level = "debug", skip(config), fields(user_agent = %config.user_agent))]
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let client = client_builder(config).build()?;
        Ok(Self { client })
    }
}

fn client_builder(config: &FetcherConfig) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.read_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .cookie_store(true)
        .gzip(true)
        .user_agent(config.user_agent.clone())
        .default_headers(config.extra_headers.clone())
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        let final_url = response.url().clone();
        if final_url != *url {
            debug!(final_url = %final_url, "followed redirect");
        }

        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::http_status(url.as_str(), status.as_u16()));
        }

        let headers = response.headers().clone();
        let body_url = final_url.to_string();
        let body = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|e| FetchError::from_reqwest(body_url.as_str(), e)));

        debug!(status = status.as_u16(), "fetched");
        Ok(FetchResult {
            status,
            headers,
            final_url,
            body: Box::pin(body),
        })
    }
}
