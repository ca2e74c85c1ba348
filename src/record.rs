//! Book metadata record types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire format of [`BookRecord::publish_date`].
pub const PUBLISH_DATE_FORMAT: &str = "%Y-%m-%d";

/// One book's metadata, produced by acquisition or read from the store.
///
/// Text fields default to the empty string and numeric fields to 0 when the
/// source has no value. `unique_code` and `volume` are only meaningful on the
/// write path, where they identify one physical copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookRecord {
    /// Book title.
    pub title: String,
    /// Price in minor currency units (cents).
    pub price: i64,
    /// Author line as printed.
    pub author: String,
    /// Publisher name.
    pub publisher: String,
    /// Series the book belongs to.
    pub series: String,
    /// Tag labels in source order.
    pub tags: Vec<String>,
    /// ISBN; the lookup key on both read and write paths.
    pub isbn: String,
    /// Publication date as `YYYY-MM-DD`, or empty when unknown.
    pub publish_date: String,
    /// Binding (paperback, hardcover...).
    pub binding: String,
    /// Page format (e.g. `16开`).
    pub format: String,
    /// Page count.
    pub pages: i64,
    /// Word count.
    pub word_count: i64,
    /// Content introduction.
    pub content_intro: String,
    /// Author introduction.
    pub author_intro: String,
    /// Table of contents.
    pub menu: String,
    /// Identifier of one physical copy (write path only).
    pub unique_code: String,
    /// Volume number of the copy (write path only).
    pub volume: i64,
}

impl BookRecord {
    /// Parses [`Self::publish_date`] as an ISO calendar date.
    ///
    /// # Errors
    ///
    /// Returns the chrono parse error when the value is not `YYYY-MM-DD`.
    pub fn parsed_publish_date(&self) -> Result<NaiveDate, chrono::ParseError> {
        parse_publish_date(&self.publish_date)
    }
}

/// Parses a `YYYY-MM-DD` publish date.
///
/// # Errors
///
/// Returns the chrono parse error for any other shape, including empty input.
pub fn parse_publish_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), PUBLISH_DATE_FORMAT)
}

/// Formats a stored date into the record's wire form.
#[must_use]
pub fn format_publish_date(date: NaiveDate) -> String {
    date.format(PUBLISH_DATE_FORMAT).to_string()
}

/// Empty acknowledgement returned by a successful put.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutAck {}
