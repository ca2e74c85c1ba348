//! Catalog endpoint configuration.

use url::Url;

use crate::error::BookError;

/// Root of the public catalog; relative result links resolve against it.
pub const DEFAULT_BASE_URL: &str = "https://www.dushu.com/";

/// Search endpoint template.
pub const DEFAULT_SEARCH_URL: &str = "https://www.dushu.com/search.aspx?wd={isbn}";

/// Placeholder replaced by the URL-encoded ISBN.
pub const ISBN_PLACEHOLDER: &str = "{isbn}";

/// Where the catalog lives: a base URL and a search URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEndpoints {
    base_url: Url,
    search_url: String,
}

impl CatalogEndpoints {
    /// Validates and builds endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::InvalidUrl`] when `base_url` does not parse or
    /// `search_url` lacks the `{isbn}` placeholder or does not parse.
    pub fn new(base_url: &str, search_url: impl Into<String>) -> Result<Self, BookError> {
        let search_url = search_url.into();
        let base_url = Url::parse(base_url).map_err(|e| BookError::invalid_url(base_url, e))?;
        if !search_url.contains(ISBN_PLACEHOLDER) {
            return Err(BookError::invalid_url(
                &search_url,
                format!("search URL template must contain {ISBN_PLACEHOLDER}"),
            ));
        }
        let endpoints = Self {
            base_url,
            search_url,
        };
        endpoints.search_url_for("0")?;
        Ok(endpoints)
    }

    /// Endpoints of the public catalog.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::InvalidUrl`] only if the built-in constants are broken.
    pub fn public() -> Result<Self, BookError> {
        Self::new(DEFAULT_BASE_URL, DEFAULT_SEARCH_URL)
    }

    /// Builds the search URL for `isbn`.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::InvalidUrl`] when the templated URL does not parse.
    pub fn search_url_for(&self, isbn: &str) -> Result<Url, BookError> {
        let raw = self
            .search_url
            .replace(ISBN_PLACEHOLDER, &urlencoding::encode(isbn));
        Url::parse(&raw).map_err(|e| BookError::invalid_url(&raw, e))
    }

    /// Resolves a (possibly relative) result link against the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::InvalidUrl`] when the link cannot be resolved.
    pub fn resolve_link(&self, href: &str) -> Result<Url, BookError> {
        self.base_url
            .join(href)
            .map_err(|e| BookError::invalid_url(href, e))
    }
}
