//! Ordered selector-fallback lists for article fields
//!
//! Each field is resolved by trying its selectors in order; the first one
//! whose first match has non-empty text wins. Layouts differ between page
//! versions, so the lists run from the most specific id to generic tags.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

pub const TITLE_SELECTORS: &[&str] = &["#activity-name", ".rich_media_title", "h1", ".title"];
pub const AUTHOR_SELECTORS: &[&str] = &["#js_author_name", ".rich_media_meta_text", ".author", ".by"];
pub const PUBLISH_TIME_SELECTORS: &[&str] = &["#publish_time", ".rich_media_meta_text", ".time", ".date"];
pub const BODY_SELECTORS: &[&str] = &["#js_content", ".rich_media_content", ".content", "article"];

pub const UNKNOWN_TITLE: &str = "unknown title";
pub const UNKNOWN_AUTHOR: &str = "unknown author";
pub const UNKNOWN_TIME: &str = "unknown time";
pub const EXTRACTION_FAILED: &str = "extraction failed";

fn compile(list: &[&str]) -> Vec<Selector> {
    list.iter()
        .map(|s| {
            Selector::parse(s).unwrap_or_else(|e| panic!("BUG: hardcoded CSS selector '{s}' is invalid: {e}"))
        })
        .collect()
}

static TITLE: LazyLock<Vec<Selector>> = LazyLock::new(|| compile(TITLE_SELECTORS));
static AUTHOR: LazyLock<Vec<Selector>> = LazyLock::new(|| compile(AUTHOR_SELECTORS));
static PUBLISH_TIME: LazyLock<Vec<Selector>> = LazyLock::new(|| compile(PUBLISH_TIME_SELECTORS));
static BODY: LazyLock<Vec<Selector>> = LazyLock::new(|| compile(BODY_SELECTORS));

pub(crate) static IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img").expect("BUG: hardcoded CSS selector 'img' is invalid"));

/// A text field resolved through an ordered selector list with a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleField {
    Title,
    Author,
    PublishTime,
}

impl ArticleField {
    fn selectors(self) -> &'static [Selector] {
        match self {
            Self::Title => &TITLE,
            Self::Author => &AUTHOR,
            Self::PublishTime => &PUBLISH_TIME,
        }
    }

    #[must_use]
    pub fn default_value(self) -> &'static str {
        match self {
            Self::Title => UNKNOWN_TITLE,
            Self::Author => UNKNOWN_AUTHOR,
            Self::PublishTime => UNKNOWN_TIME,
        }
    }

    /// Resolve the field, falling back to its default.
    #[must_use]
    pub fn resolve(self, document: &Html) -> String {
        first_text(document, self.selectors())
            .unwrap_or_else(|| self.default_value().to_string())
    }
}

/// Text nodes trimmed, empties dropped, joined with `separator`.
#[must_use]
pub fn stripped_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Probe one selector: its first match, if that match has non-empty text.
fn probe<'a>(document: &'a Html, selector: &Selector) -> Option<(ElementRef<'a>, String)> {
    let element = document.select(selector).next()?;
    let text = stripped_text(element, "");
    (!text.is_empty()).then_some((element, text))
}

/// First non-empty text across an ordered selector list.
#[must_use]
pub fn first_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .find_map(|selector| probe(document, selector))
        .map(|(_, text)| text)
}

/// The article body element: first body selector whose match has text.
#[must_use]
pub fn find_body(document: &Html) -> Option<ElementRef<'_>> {
    BODY.iter()
        .find_map(|selector| probe(document, selector))
        .map(|(element, _)| element)
}
