//! Markup extraction for catalog pages.
//!
//! Turns fetched page bytes into values without touching the network:
//!
//! - [`Document`] / [`Pattern`] - HTML parsing and selection (scraper)
//! - [`FIELD_RULES`] - One declarative rule per record field
//! - [`first_result_href`] - Result link on a search page
//! - [`ExtractError`] - Malformed content
//!
//! Absent fields take their zero value. A price, page count or word count
//! that is present but not numeric fails the whole page.

mod document;
mod error;
mod rules;
mod search;
mod value;

pub use document::{
    Document, Pattern, compile_static_selector, element_text, first_child_text,
    next_element_sibling,
};
pub use error::ExtractError;
pub use rules::{FIELD_RULES, Field, FieldRule, Strategy};
pub use search::first_result_href;
pub use value::{normalize_text, parse_count, parse_price, split_tags};

use tracing::debug;

use crate::record::BookRecord;

/// Applies every field rule to `document` and assembles a record.
///
/// # Errors
///
/// Returns [`ExtractError::MalformedNumber`] when a numeric field is present
/// but unparseable.
pub fn extract_record(document: &Document) -> Result<BookRecord, ExtractError> {
    let mut record = BookRecord::default();
    for rule in FIELD_RULES.iter() {
        match rule.extract(document) {
            Some(text) => rule.field.assign(&mut record, text)?,
            None => debug!(field = %rule.field, "field absent on page"),
        }
    }
    Ok(record)
}

/// Parses a detail page body and extracts its record.
///
/// # Errors
///
/// Returns [`ExtractError`] for a non-UTF-8 body or a malformed numeric field.
pub fn parse_book_page(body: &[u8]) -> Result<BookRecord, ExtractError> {
    let document = Document::parse(body)?;
    extract_record(&document)
}

/// Parses a search page body and returns the first result's `href`.
///
/// # Errors
///
/// Returns [`ExtractError`] for a non-UTF-8 body or a result link without
/// `href`.
pub fn parse_search_page(body: &[u8]) -> Result<Option<String>, ExtractError> {
    let document = Document::parse(body)?;
    first_result_href(&document)
}
