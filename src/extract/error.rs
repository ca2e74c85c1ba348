//! Error types for markup extraction.

use thiserror::Error;

use super::Field;

/// Errors raised while turning a catalog page into values.
///
/// A missing field is never an error; only content that is present but
/// unusable is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The page body is not UTF-8 text.
    #[error("page body is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    /// A numeric field holds text that is not a number.
    #[error("malformed {field} value '{value}': expected {expected}")]
    MalformedNumber {
        /// Field the value was read for.
        field: Field,
        /// The offending text after trimming.
        value: String,
        /// What the field accepts.
        expected: &'static str,
    },

    /// A search result link carries no `href`.
    #[error("search result link has no href attribute\n  Suggestion: The catalog search page layout may have changed")]
    MissingHref,
}

impl ExtractError {
    /// Creates a `MalformedNumber` error.
    #[must_use]
    pub fn malformed_number(field: Field, value: &str, expected: &'static str) -> Self {
        Self::MalformedNumber {
            field,
            value: value.to_string(),
            expected,
        }
    }
}
