//! Result-link selection on catalog search pages.

use std::sync::LazyLock;

use super::ExtractError;
use super::document::{Document, Pattern};

/// Link of one book in the search result list.
static RESULT_LINK: LazyLock<Pattern> = LazyLock::new(|| Pattern::css("div.book-info > h3 > a"));

/// Returns the `href` of the first search result, or `None` for no results.
///
/// # Errors
///
/// Returns [`ExtractError::MissingHref`] when the first result link has no
/// `href`.
pub fn first_result_href(document: &Document) -> Result<Option<String>, ExtractError> {
    let Some(link) = document.first(&RESULT_LINK) else {
        return Ok(None);
    };
    link.value()
        .attr("href")
        .map(|href| Some(href.trim().to_string()))
        .ok_or(ExtractError::MissingHref)
}
