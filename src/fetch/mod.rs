//! Page fetching for catalog lookups.
//!
//! - [`Fetcher`] - Async seam: one GET, decompressed body bytes back
//! - [`HttpFetcher`] - reqwest session with browser headers and a cookie jar
//! - [`FetchError`] - Transport failures

mod client;
mod error;
mod headers;

pub use client::{CONNECT_TIMEOUT_SECS, HttpFetcher, HttpTimeouts, READ_TIMEOUT_SECS};
pub use error::FetchError;
pub use headers::{BROWSER_USER_AGENT, DEFAULT_HEADERS, build_header_map};

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

/// Performs one HTTP GET and returns the (decompressed) body.
///
/// Implementations never retry.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` and returns its body bytes.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        (**self).fetch(url).await
    }
}
