//! Declarative per-field extraction rules for catalog detail pages.
//!
//! Each [`FieldRule`] pairs a [`Pattern`] locating an anchor element with a
//! [`Strategy`] saying where the value sits relative to it. Rules are applied
//! independently against one parsed [`Document`].

use std::fmt;
use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::record::BookRecord;

use super::document::{
    Document, Pattern, compile_static_selector, element_text, first_child_text,
    next_element_sibling,
};
use super::value::{normalize_text, parse_count, parse_price, split_tags};
use super::ExtractError;

static ANCHOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a"));

/// A record field filled from a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Book title.
    Title,
    /// Price in minor units.
    Price,
    /// Author line.
    Author,
    /// Publisher name.
    Publisher,
    /// Series name.
    Series,
    /// Comma-separated tag labels.
    Tags,
    /// ISBN as printed.
    Isbn,
    /// Publication date text.
    PublishDate,
    /// Binding.
    Binding,
    /// Page format.
    Format,
    /// Page count.
    Pages,
    /// Word count.
    WordCount,
    /// Content introduction section.
    ContentIntro,
    /// Author introduction section.
    AuthorIntro,
    /// Table of contents section.
    Menu,
}

impl Field {
    /// Returns the field's snake_case name, matching [`BookRecord`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Price => "price",
            Self::Author => "author",
            Self::Publisher => "publisher",
            Self::Series => "series",
            Self::Tags => "tags",
            Self::Isbn => "isbn",
            Self::PublishDate => "publish_date",
            Self::Binding => "binding",
            Self::Format => "format",
            Self::Pages => "pages",
            Self::WordCount => "word_count",
            Self::ContentIntro => "content_intro",
            Self::AuthorIntro => "author_intro",
            Self::Menu => "menu",
        }
    }

    /// Stores normalized `text` into the matching record field.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::MalformedNumber`] for a non-numeric price,
    /// page count or word count.
    pub fn assign(self, record: &mut BookRecord, text: String) -> Result<(), ExtractError> {
        match self {
            Self::Title => record.title = text,
            Self::Price => record.price = parse_price(&text)?,
            Self::Author => record.author = text,
            Self::Publisher => record.publisher = text,
            Self::Series => record.series = text,
            Self::Tags => record.tags = split_tags(&text),
            Self::Isbn => record.isbn = text,
            Self::PublishDate => record.publish_date = text,
            Self::Binding => record.binding = text,
            Self::Format => record.format = text,
            Self::Pages => record.pages = parse_count(self, &text)?,
            Self::WordCount => record.word_count = parse_count(self, &text)?,
            Self::ContentIntro => record.content_intro = text,
            Self::AuthorIntro => record.author_intro = text,
            Self::Menu => record.menu = text,
        }
        Ok(())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a field's value sits relative to the located element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The located element's own text.
    NodeText,
    /// Text of the next sibling element (label cell → value cell).
    SiblingText,
    /// Text of the first `a` inside the next sibling, skipping cover-image links.
    NestedAnchorText,
    /// Text of the first child of the next sibling (section heading → body).
    FirstChildOfSiblingText,
}

impl Strategy {
    fn read(self, element: ElementRef<'_>) -> Option<String> {
        match self {
            Self::NodeText => Some(element_text(element)),
            Self::SiblingText => next_element_sibling(element).map(element_text),
            Self::NestedAnchorText => next_element_sibling(element)
                .and_then(|sibling| {
                    sibling
                        .select(&ANCHOR)
                        .find(|anchor| !normalize_text(&element_text(*anchor)).is_empty())
                })
                .map(element_text),
            Self::FirstChildOfSiblingText => {
                next_element_sibling(element).and_then(first_child_text)
            }
        }
    }
}

/// One field's extraction rule.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Record field the rule fills.
    pub field: Field,
    /// Locates the anchor element.
    pub pattern: Pattern,
    /// Reads the value relative to the anchor.
    pub strategy: Strategy,
}

impl FieldRule {
    fn new(field: Field, pattern: Pattern, strategy: Strategy) -> Self {
        Self {
            field,
            pattern,
            strategy,
        }
    }

    /// Returns the normalized field text, or `None` when the page lacks it.
    #[must_use]
    pub fn extract(&self, document: &Document) -> Option<String> {
        let anchor = document.first(&self.pattern)?;
        self.strategy
            .read(anchor)
            .map(|raw| normalize_text(&raw))
    }
}

fn cell(field: Field, label: &'static str) -> FieldRule {
    FieldRule::new(field, Pattern::labelled("td", label), Strategy::SiblingText)
}

fn section(field: Field, heading: &'static str) -> FieldRule {
    FieldRule::new(
        field,
        Pattern::labelled("h4", heading),
        Strategy::FirstChildOfSiblingText,
    )
}

/// Rules for every field of a detail page, in record order.
pub static FIELD_RULES: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            Field::Title,
            Pattern::css("div.book-title > h1"),
            Strategy::NodeText,
        ),
        FieldRule::new(
            Field::Price,
            Pattern::css("p.price > span.num"),
            Strategy::NodeText,
        ),
        cell(Field::Author, "作　者："),
        FieldRule::new(
            Field::Publisher,
            Pattern::labelled("td", "出版社："),
            Strategy::NestedAnchorText,
        ),
        cell(Field::Series, "丛编项："),
        cell(Field::Tags, "标　签："),
        cell(Field::Isbn, "ISBN："),
        cell(Field::PublishDate, "出版时间："),
        cell(Field::Binding, "包装："),
        cell(Field::Format, "开本："),
        cell(Field::Pages, "页数："),
        cell(Field::WordCount, "字数："),
        section(Field::ContentIntro, "内容简介"),
        section(Field::AuthorIntro, "作者简介"),
        section(Field::Menu, "图书目录"),
    ]
});
