//! Live catalog lookup: ISBN → search page → detail page → record.
//!
//! - [`Crawler::search`] - Resolves an ISBN to the first result's detail URL
//! - [`Crawler::acquire`] - Fetches one detail page and extracts a record
//! - [`Crawler::crawl`] - Both, end to end
//!
//! Every stage is a single attempt; there is no retry.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use bookinfo_core::crawler::{CatalogEndpoints, Crawler};
//! use bookinfo_core::fetch::HttpFetcher;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let crawler = Crawler::new(HttpFetcher::new(&BTreeMap::new())?, CatalogEndpoints::public()?);
//! let record = crawler.crawl("9787544258609").await?;
//! println!("{}", record.title);
//! # Ok(())
//! # }
//! ```

mod endpoints;

pub use endpoints::{CatalogEndpoints, DEFAULT_BASE_URL, DEFAULT_SEARCH_URL, ISBN_PLACEHOLDER};

use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::BookError;
use crate::extract::{parse_book_page, parse_search_page};
use crate::fetch::Fetcher;
use crate::record::BookRecord;

/// Resolver and acquirer over one fetch session.
#[derive(Debug, Clone)]
pub struct Crawler<F> {
    fetcher: F,
    endpoints: CatalogEndpoints,
}

impl<F: Fetcher> Crawler<F> {
    /// Creates a crawler using `fetcher` against `endpoints`.
    #[must_use]
    pub fn new(fetcher: F, endpoints: CatalogEndpoints) -> Self {
        Self { fetcher, endpoints }
    }

    /// Returns the fetcher.
    #[must_use]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns the configured endpoints.
    #[must_use]
    pub fn endpoints(&self) -> &CatalogEndpoints {
        &self.endpoints
    }

    /// Searches the catalog and returns the absolute URL of the first result.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::NotFound`] when the search has no results,
    /// [`BookError::Fetch`], [`BookError::Parse`] or [`BookError::InvalidUrl`]
    /// when a stage fails.
    #[instrument(skip(self))]
    pub async fn search(&self, isbn: &str) -> Result<Url, BookError> {
        let search_url = self.endpoints.search_url_for(isbn)?;
        let body = self.fetcher.fetch(&search_url).await?;

        let Some(href) = parse_search_page(&body)? else {
            debug!("search returned no results");
            return Err(BookError::not_found(isbn));
        };

        let detail_url = self.endpoints.resolve_link(&href)?;
        debug!(detail_url = %detail_url, "resolved first search result");
        Ok(detail_url)
    }

    /// Fetches the detail page at `url` and extracts a record from it.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::Fetch`] for transport failures and
    /// [`BookError::Parse`] for a non-UTF-8 page or a malformed numeric field.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn acquire(&self, url: &Url) -> Result<BookRecord, BookError> {
        let body = self.fetcher.fetch(url).await?;
        Ok(parse_book_page(&body)?)
    }

    /// Looks `isbn` up on the live catalog.
    ///
    /// The record's ISBN falls back to `isbn` when the page does not print one.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::search`] or [`Self::acquire`]; no
    /// detail page is fetched when the search fails.
    #[instrument(skip(self))]
    pub async fn crawl(&self, isbn: &str) -> Result<BookRecord, BookError> {
        let detail_url = self.search(isbn).await?;
        let mut record = self.acquire(&detail_url).await?;

        if record.isbn.is_empty() {
            record.isbn = isbn.to_string();
        } else if record.isbn != isbn {
            warn!(page_isbn = %record.isbn, "detail page ISBN differs from lookup ISBN");
        }
        Ok(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::fetch::FetchError;

    /// Serves canned bodies by URL and records every request.
    #[derive(Default)]
    struct CannedFetcher {
        pages: HashMap<String, Vec<u8>>,
        requests: Mutex<Vec<String>>,
    }

    impl CannedFetcher {
        fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.as_bytes().to_vec());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::http_status(url.as_str(), 404))
        }
    }

    const SEARCH_URL: &str = "https://www.dushu.com/search.aspx?wd=9787544258609";
    const DETAIL_URL: &str = "https://www.dushu.com/book/13718476/";

    fn crawler(fetcher: CannedFetcher) -> Crawler<CannedFetcher> {
        Crawler::new(fetcher, CatalogEndpoints::public().unwrap())
    }

    #[tokio::test]
    async fn test_search_resolves_relative_link() {
        let fetcher = CannedFetcher::default().with_page(
            SEARCH_URL,
            r#"<div class="book-info"><h3><a href="/book/13718476/">白夜行</a></h3></div>"#,
        );
        let url = crawler(fetcher).search("9787544258609").await.unwrap();
        assert_eq!(url.as_str(), DETAIL_URL);
    }

    #[tokio::test]
    async fn test_crawl_not_found_never_fetches_detail_page() {
        let crawler = crawler(CannedFetcher::default().with_page(SEARCH_URL, "<p>none</p>"));
        let err = crawler.crawl("9787544258609").await.unwrap_err();

        assert!(matches!(err, BookError::NotFound { ref isbn } if isbn == "9787544258609"));
        assert_eq!(crawler.fetcher.requests(), vec![SEARCH_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_crawl_fills_missing_isbn_from_lookup_key() {
        let fetcher = CannedFetcher::default()
            .with_page(
                SEARCH_URL,
                r#"<div class="book-info"><h3><a href="/book/13718476/">x</a></h3></div>"#,
            )
            .with_page(DETAIL_URL, r#"<div class="book-title"><h1>白夜行</h1></div>"#);
        let crawler = crawler(fetcher);

        let record = crawler.crawl("9787544258609").await.unwrap();
        assert_eq!(record.title, "白夜行");
        assert_eq!(record.isbn, "9787544258609");
        assert_eq!(crawler.fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_search_fetch_failure_propagates() {
        let err = crawler(CannedFetcher::default())
            .search("9787544258609")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BookError::Fetch(FetchError::HttpStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_acquire_malformed_price_is_parse_error() {
        let fetcher = CannedFetcher::default().with_page(
            DETAIL_URL,
            r#"<p class="price"><span class="num">¥abc</span></p>"#,
        );
        let err = crawler(fetcher)
            .acquire(&Url::parse(DETAIL_URL).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, BookError::Parse(_)));
    }
}
