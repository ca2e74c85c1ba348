//! Read-through lookup and write-through sync of book metadata.
//!
//! - [`BookService::get`] - Stored record if present, else a live crawl (not persisted)
//! - [`BookService::put`] - Upserts metadata, registers a physical copy, replaces tags
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use bookinfo_core::Database;
//! use bookinfo_core::crawler::{CatalogEndpoints, Crawler};
//! use bookinfo_core::fetch::HttpFetcher;
//! use bookinfo_core::service::BookService;
//! use bookinfo_core::store::SqliteBookStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteBookStore::new(Database::new_in_memory().await?);
//! let crawler = Crawler::new(HttpFetcher::new(&BTreeMap::new())?, CatalogEndpoints::public()?);
//! let service = BookService::new(store, crawler);
//! let record = service.get("9787544258609").await?;
//! println!("{}", record.title);
//! # Ok(())
//! # }
//! ```

mod lock;

pub use lock::{IsbnGuard, IsbnLocks};

use tracing::{debug, info, instrument};

use crate::crawler::Crawler;
use crate::error::BookError;
use crate::fetch::Fetcher;
use crate::record::{BookRecord, PutAck};
use crate::store::{BookInfoRow, BookStore, NewBookCopy, StoreDbErrorKind, StoreError, TagRow};

/// Sync service over a store and a live crawler.
#[derive(Debug)]
pub struct BookService<S, F> {
    store: S,
    crawler: Crawler<F>,
    locks: IsbnLocks,
}

impl<S: BookStore, F: Fetcher> BookService<S, F> {
    /// Creates a service.
    #[must_use]
    pub fn new(store: S, crawler: Crawler<F>) -> Self {
        Self {
            store,
            crawler,
            locks: IsbnLocks::new(),
        }
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the crawler used on store misses.
    #[must_use]
    pub fn crawler(&self) -> &Crawler<F> {
        &self.crawler
    }

    /// Returns the stored record for `isbn`, falling back to a live crawl.
    ///
    /// A crawled record is returned as-is and never written to the store.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::Store`] when the store read fails, otherwise any
    /// error from [`Crawler::crawl`].
    #[instrument(skip(self))]
    pub async fn get(&self, isbn: &str) -> Result<BookRecord, BookError> {
        if let Some(row) = self.store.query_book_info_by_isbn(isbn).await? {
            let tags = self
                .store
                .query_tags_for_isbn(isbn)
                .await?
                .into_iter()
                .map(|tag| tag.tag)
                .collect();
            info!(source = "store", "book found");
            return Ok(row.into_record(tags));
        }

        debug!("store miss, crawling catalog");
        let record = self.crawler.crawl(isbn).await?;
        info!(source = "catalog", title = %record.title, "book found");
        Ok(record)
    }

    /// Stores `record`, registers its physical copy and replaces its tags.
    ///
    /// Input is validated before any write; the unique code is checked before
    /// the metadata upsert. Puts for the same ISBN run one at a time. A backend
    /// failure part-way leaves earlier steps applied.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::Validation`] for an empty ISBN or unique code or a
    /// publish date not in `YYYY-MM-DD` form, [`BookError::DuplicateKey`] when
    /// the unique code is already registered, and [`BookError::Store`] for
    /// backend failures.
    #[instrument(skip(self, record), fields(isbn = %record.isbn, unique_code = %record.unique_code))]
    pub async fn put(&self, record: &BookRecord) -> Result<PutAck, BookError> {
        if record.isbn.trim().is_empty() {
            return Err(BookError::validation("isbn", "must not be empty"));
        }
        let publish_date = record.parsed_publish_date().map_err(|e| {
            BookError::validation(
                "publish_date",
                format!("'{}' is not a YYYY-MM-DD date: {e}", record.publish_date),
            )
        })?;
        if record.unique_code.is_empty() {
            return Err(BookError::validation("unique_code", "must not be empty"));
        }

        let _guard = self.locks.lock(&record.isbn).await;

        if let Some(existing) = self
            .store
            .query_book_copy_by_unique_code(&record.unique_code)
            .await?
        {
            debug!(existing_isbn = %existing.isbn, "unique code already registered");
            return Err(BookError::DuplicateKey {
                unique_code: record.unique_code.clone(),
            });
        }

        self.store
            .upsert_book_info(&BookInfoRow::from_record(record, publish_date))
            .await?;

        let copy_id = self
            .store
            .insert_book_copy(&NewBookCopy {
                isbn: &record.isbn,
                volume: record.volume,
                unique_code: &record.unique_code,
            })
            .await?;

        self.replace_tags(&record.isbn, &record.tags).await?;

        info!(copy_id, tags = record.tags.len(), "book stored");
        Ok(PutAck::default())
    }

    /// Detaches every current tag from `isbn`, then attaches `labels`.
    async fn replace_tags(&self, isbn: &str, labels: &[String]) -> Result<(), BookError> {
        for tag in self.store.query_tags_for_isbn(isbn).await? {
            self.store.remove_tag_association(isbn, &tag).await?;
        }
        for label in labels {
            let tag = self.resolve_tag(label).await?;
            self.store.add_tag_association(isbn, &tag).await?;
        }
        Ok(())
    }

    /// Inserts `label`, or returns the existing row when it is already shared.
    async fn resolve_tag(&self, label: &str) -> Result<TagRow, BookError> {
        match self.store.insert_tag(label).await {
            Ok(tag) => Ok(tag),
            Err(StoreError::DuplicateLabel(_)) => {
                debug!(label, "reusing existing tag");
                self.store
                    .query_tag_by_label(label)
                    .await?
                    .ok_or_else(|| {
                        BookError::Store(StoreError::Database {
                            kind: StoreDbErrorKind::RowNotFound,
                            message: format!("tag '{label}' reported as duplicate but not found"),
                        })
                    })
            }
            Err(e) => Err(e.into()),
        }
    }
}
