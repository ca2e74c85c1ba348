//! Parsed page and selection patterns over it.
//!
//! A [`Pattern`] is a CSS selector, which covers class/attribute matches and
//! structural descent, optionally narrowed to elements whose trimmed text
//! equals a fixed label. Labelled table cells and section headings on the
//! catalog are only distinguishable by their text, which CSS cannot match.

use scraper::{ElementRef, Html, Node, Selector};

use super::ExtractError;
use super::value::normalize_text;

/// Compiles a selector known at build time.
///
/// # Panics
///
/// Panics if `pattern` is not a valid selector; only call with literals.
#[must_use]
pub fn compile_static_selector(pattern: &str) -> Selector {
    Selector::parse(pattern).unwrap_or_else(|e| panic!("invalid static selector '{pattern}': {e:?}"))
}

/// A selector plus an optional exact-text label.
#[derive(Debug, Clone)]
pub struct Pattern {
    selector: Selector,
    label: Option<&'static str>,
}

impl Pattern {
    /// Matches every element selected by `selector`.
    #[must_use]
    pub fn css(selector: &str) -> Self {
        Self {
            selector: compile_static_selector(selector),
            label: None,
        }
    }

    /// Matches elements selected by `selector` whose normalized text is `label`.
    #[must_use]
    pub fn labelled(selector: &str, label: &'static str) -> Self {
        Self {
            selector: compile_static_selector(selector),
            label: Some(label),
        }
    }

    fn matches(&self, element: ElementRef<'_>) -> bool {
        self.label
            .is_none_or(|label| normalize_text(&element_text(element)) == label)
    }
}

/// A parsed HTML page.
///
/// `scraper::Html` is not `Send`; parse and extract without awaiting in
/// between.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a UTF-8 page body.
    ///
    /// HTML parsing itself is error-tolerant; only a non-UTF-8 body fails.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidEncoding`] when `body` is not UTF-8.
    pub fn parse(body: &[u8]) -> Result<Self, ExtractError> {
        let text = std::str::from_utf8(body)?;
        Ok(Self {
            html: Html::parse_document(text),
        })
    }

    /// Returns all elements matching `pattern`, in document order.
    pub fn select<'a>(&'a self, pattern: &'a Pattern) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html
            .select(&pattern.selector)
            .filter(move |element| pattern.matches(*element))
    }

    /// Returns the first element matching `pattern`.
    #[must_use]
    pub fn first<'a>(&'a self, pattern: &'a Pattern) -> Option<ElementRef<'a>> {
        self.select(pattern).next()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document").finish_non_exhaustive()
    }
}

/// Concatenated text of `element` and its descendants, entities decoded.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// The next sibling that is an element, skipping text and comments.
#[must_use]
pub fn next_element_sibling(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    element.next_siblings().find_map(ElementRef::wrap)
}

/// Text of the first meaningful child: a non-blank text node or an element.
#[must_use]
pub fn first_child_text(element: ElementRef<'_>) -> Option<String> {
    element.children().find_map(|child| match child.value() {
        Node::Text(text) if !text.trim().is_empty() => Some(String::from(&**text)),
        Node::Element(_) => ElementRef::wrap(child).map(element_text),
        _ => None,
    })
}
