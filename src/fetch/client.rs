//! reqwest-backed catalog session.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::cookie::Jar;
use tracing::{debug, instrument};
use url::Url;

use super::headers::build_header_map;
use super::{FetchError, Fetcher};

/// Default connect timeout in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout in seconds.
pub const READ_TIMEOUT_SECS: u64 = 30;

/// Connect and read timeouts for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Seconds allowed to establish a connection.
    pub connect_secs: u64,
    /// Seconds allowed for the whole request, body included.
    pub read_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: CONNECT_TIMEOUT_SECS,
            read_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// One HTTP session against the catalog.
///
/// Headers are fixed when the session is built. Cookies set by the catalog
/// are kept in a jar shared by every request the session issues; the jar
/// synchronizes internally, so one `HttpFetcher` can serve concurrent lookups.
/// gzip-encoded bodies are decompressed transparently.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    cookie_jar: Arc<Jar>,
}

impl HttpFetcher {
    /// Builds a session with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidHeader`] for a bad override and
    /// [`FetchError::Client`] when the client cannot be constructed.
    pub fn new(header_overrides: &BTreeMap<String, String>) -> Result<Self, FetchError> {
        Self::with_timeouts(header_overrides, HttpTimeouts::default())
    }

    /// Builds a session with explicit timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidHeader`] for a bad override and
    /// [`FetchError::Client`] when the client cannot be constructed.
    #[instrument(level = "debug", skip(header_overrides), fields(overrides = header_overrides.len()))]
    pub fn with_timeouts(
        header_overrides: &BTreeMap<String, String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, FetchError> {
        let headers = build_header_map(header_overrides)?;
        let cookie_jar = Arc::new(Jar::default());

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.read_secs))
            .default_headers(headers)
            .cookie_provider(Arc::clone(&cookie_jar))
            .gzip(true)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client, cookie_jar })
    }

    /// Returns the session's cookie jar.
    #[must_use]
    pub fn cookie_jar(&self) -> Arc<Jar> {
        Arc::clone(&self.cookie_jar)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url.as_str(), status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        debug!(bytes = body.len(), "fetched page");
        Ok(body.to_vec())
    }
}
