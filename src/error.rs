//! Caller-facing error taxonomy for Get, Put and Crawl.
//!
//! Collaborator errors pass through unchanged inside their variant. The only
//! failure recovered locally is a duplicate tag label during Put.

use thiserror::Error;

use crate::extract::ExtractError;
use crate::fetch::FetchError;
use crate::store::StoreError;

/// Errors returned by the lookup and sync operations.
#[derive(Debug, Error)]
pub enum BookError {
    /// The catalog search returned no result for the ISBN.
    #[error("no book for isbn {isbn}\n  Suggestion: Check the ISBN digits or search the catalog manually")]
    NotFound {
        /// The ISBN that was searched.
        isbn: String,
    },

    /// Network or transport failure.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Page content could not be turned into values.
    #[error(transparent)]
    Parse(#[from] ExtractError),

    /// A URL could not be built or resolved.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL or reference that failed.
        url: String,
        /// Why it failed.
        reason: String,
    },

    /// Submitted input is malformed or missing a required value.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Offending record field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The unique code is already registered to another copy.
    #[error("{unique_code} unique code already exists\n  Suggestion: Every physical copy needs its own unique code")]
    DuplicateKey {
        /// The colliding unique code.
        unique_code: String,
    },

    /// Backend read or write failure.
    #[error(transparent)]
    Store(StoreError),
}

impl BookError {
    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(isbn: &str) -> Self {
        Self::NotFound {
            isbn: isbn.to_string(),
        }
    }

    /// Creates an `InvalidUrl` error.
    #[must_use]
    pub fn invalid_url(url: &str, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Validation` error.
    #[must_use]
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for BookError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(unique_code) => Self::DuplicateKey { unique_code },
            other => Self::Store(other),
        }
    }
}
