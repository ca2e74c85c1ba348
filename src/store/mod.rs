//! Persistence gateway for book metadata, tags and physical copies.
//!
//! # Overview
//!
//! - [`BookStore`] - Async data-access contract used by the service layer
//! - [`SqliteBookStore`] - `SQLite` implementation over [`Database`](crate::Database)
//! - [`BookInfoRow`], [`TagRow`], [`BookCopyRow`] - Row shapes
//! - [`StoreError`] - Operation error types
//!
//! # Example
//!
//! ```no_run
//! use bookinfo_core::Database;
//! use bookinfo_core::store::{BookStore, SqliteBookStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteBookStore::new(Database::new_in_memory().await?);
//! let tags = store.query_tags_for_isbn("9787544258609").await?;
//! assert!(tags.is_empty());
//! # Ok(())
//! # }
//! ```

mod error;
mod sqlite;

pub use error::{StoreDbErrorKind, StoreError};
pub use sqlite::SqliteBookStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::FromRow;

use crate::record::{BookRecord, format_publish_date};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// A `book_info` row. Every metadata column is nullable.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct BookInfoRow {
    /// Unique key.
    pub isbn: String,
    /// Book title.
    pub title: Option<String>,
    /// Price in minor units.
    pub price: Option<i64>,
    /// Author line.
    pub author: Option<String>,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Series name.
    pub series: Option<String>,
    /// Publication date.
    pub publish_date: Option<NaiveDate>,
    /// Binding.
    pub binding: Option<String>,
    /// Page format.
    pub format: Option<String>,
    /// Page count.
    pub pages: Option<i64>,
    /// Word count.
    pub word_count: Option<i64>,
    /// Content introduction.
    pub content_intro: Option<String>,
    /// Author introduction.
    pub author_intro: Option<String>,
    /// Table of contents.
    pub menu: Option<String>,
}

impl BookInfoRow {
    /// Builds the row persisted for `record`, with its already-parsed date.
    #[must_use]
    pub fn from_record(record: &BookRecord, publish_date: NaiveDate) -> Self {
        Self {
            isbn: record.isbn.clone(),
            title: Some(record.title.clone()),
            price: Some(record.price),
            author: Some(record.author.clone()),
            publisher: Some(record.publisher.clone()),
            series: Some(record.series.clone()),
            publish_date: Some(publish_date),
            binding: Some(record.binding.clone()),
            format: Some(record.format.clone()),
            pages: Some(record.pages),
            word_count: Some(record.word_count),
            content_intro: Some(record.content_intro.clone()),
            author_intro: Some(record.author_intro.clone()),
            menu: Some(record.menu.clone()),
        }
    }

    /// Converts the row into a record, null columns becoming zero values.
    #[must_use]
    pub fn into_record(self, tags: Vec<String>) -> BookRecord {
        BookRecord {
            title: self.title.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            publisher: self.publisher.unwrap_or_default(),
            series: self.series.unwrap_or_default(),
            tags,
            isbn: self.isbn,
            publish_date: self.publish_date.map(format_publish_date).unwrap_or_default(),
            binding: self.binding.unwrap_or_default(),
            format: self.format.unwrap_or_default(),
            pages: self.pages.unwrap_or_default(),
            word_count: self.word_count.unwrap_or_default(),
            content_intro: self.content_intro.unwrap_or_default(),
            author_intro: self.author_intro.unwrap_or_default(),
            menu: self.menu.unwrap_or_default(),
            unique_code: String::new(),
            volume: 0,
        }
    }
}

/// A shared tag label.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TagRow {
    /// Row id.
    pub id: i64,
    /// Label text, unique across books.
    pub tag: String,
}

/// A persisted physical copy.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BookCopyRow {
    /// Row id.
    pub id: i64,
    /// Book the copy belongs to.
    pub isbn: String,
    /// Volume number.
    pub volume: i64,
    /// Identifier of this physical copy.
    pub unique_code: String,
}

/// A physical copy about to be inserted.
#[derive(Debug, Clone, Copy)]
pub struct NewBookCopy<'a> {
    /// Book the copy belongs to; must already be stored.
    pub isbn: &'a str,
    /// Volume number.
    pub volume: i64,
    /// Identifier of this physical copy.
    pub unique_code: &'a str,
}

/// Data-access contract for book metadata persistence.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Returns the metadata row for `isbn`, if any.
    async fn query_book_info_by_isbn(&self, isbn: &str) -> Result<Option<BookInfoRow>>;

    /// Inserts the row, or updates every column in place when the ISBN exists.
    async fn upsert_book_info(&self, row: &BookInfoRow) -> Result<()>;

    /// Returns the tags attached to `isbn` in association order.
    async fn query_tags_for_isbn(&self, isbn: &str) -> Result<Vec<TagRow>>;

    /// Detaches `tag` from `isbn`. The label row itself is kept.
    async fn remove_tag_association(&self, isbn: &str, tag: &TagRow) -> Result<()>;

    /// Inserts a new label.
    ///
    /// Fails with [`StoreError::DuplicateLabel`] when the label exists.
    async fn insert_tag(&self, label: &str) -> Result<TagRow>;

    /// Returns the label row for `label`, if any.
    async fn query_tag_by_label(&self, label: &str) -> Result<Option<TagRow>>;

    /// Attaches `tag` to `isbn`; attaching twice is a no-op.
    async fn add_tag_association(&self, isbn: &str, tag: &TagRow) -> Result<()>;

    /// Returns the copy registered under `unique_code`, if any.
    async fn query_book_copy_by_unique_code(&self, unique_code: &str)
    -> Result<Option<BookCopyRow>>;

    /// Inserts a copy and returns its id.
    ///
    /// Fails with [`StoreError::DuplicateKey`] when the unique code is taken.
    async fn insert_book_copy(&self, copy: &NewBookCopy<'_>) -> Result<i64>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_book_info_row_null_columns_become_zero_values() {
        let row = BookInfoRow {
            isbn: "9787544258609".to_string(),
            ..BookInfoRow::default()
        };
        let record = row.into_record(Vec::new());
        assert_eq!(record.isbn, "9787544258609");
        assert!(record.title.is_empty());
        assert_eq!(record.price, 0);
        assert!(record.publish_date.is_empty());
    }

    #[test]
    fn test_book_info_row_round_trips_record_fields() {
        let record = BookRecord {
            title: "白夜行".to_string(),
            price: 3980,
            isbn: "9787544258609".to_string(),
            publish_date: "2013-01-01".to_string(),
            pages: 467,
            tags: vec!["小说".to_string()],
            ..BookRecord::default()
        };
        let date = record.parsed_publish_date().unwrap();
        let back = BookInfoRow::from_record(&record, date).into_record(record.tags.clone());
        assert_eq!(back, record);
    }
}
