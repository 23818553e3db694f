//! Article extraction from rendered markup
//!
//! Extraction never fails. Missing fields degrade to sentinel values and a
//! missing body yields an explicit marker with no images.

use scraper::{ElementRef, Html};

use super::schema::{ArticleRecord, ImageRef};
use super::selectors::{ArticleField, EXTRACTION_FAILED, IMG, find_body, stripped_text};
use crate::utils::{DEFAULT_BASE_HOST, normalize_image_url};

/// Parses rendered pages into `ArticleRecord`s.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    base_host: String,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_HOST)
    }
}

impl ContentExtractor {
    /// `base_host` is joined onto host-relative image URLs.
    #[must_use]
    pub fn new(base_host: impl Into<String>) -> Self {
        Self {
            base_host: base_host.into(),
        }
    }

    #[must_use]
    pub fn extract(&self, markup: &str) -> ArticleRecord {
        let document = Html::parse_document(markup);

        let title = ArticleField::Title.resolve(&document);
        let author = ArticleField::Author.resolve(&document);
        let publish_time = ArticleField::PublishTime.resolve(&document);

        let (body_text, body_html, images) = match find_body(&document) {
            Some(body) => {
                let text = stripped_text(body, "\n");
                let images = self.collect_images(body);
                (text, body.html(), images)
            }
            None => {
                tracing::warn!("No article body matched any selector");
                (EXTRACTION_FAILED.to_string(), String::new(), Vec::new())
            }
        };

        let word_count = if body_html.is_empty() {
            0
        } else {
            body_text.chars().count()
        };

        ArticleRecord {
            title,
            author,
            publish_time,
            image_count: images.len(),
            body_text,
            body_html,
            images,
            word_count,
            source_url: None,
            retrieved_at: None,
        }
    }

    /// Image elements inside the body, in document order.
    fn collect_images(&self, body: ElementRef<'_>) -> Vec<ImageRef> {
        body.select(&IMG)
            .enumerate()
            .map(|(index, element)| {
                let attrs = element.value();
                let lazy = non_empty_attr(attrs.attr("data-src"));
                let eager = non_empty_attr(attrs.attr("src"));
                let url = lazy
                    .as_deref()
                    .or(eager.as_deref())
                    .map(|raw| normalize_image_url(raw, &self.base_host));

                let mut image = ImageRef::new(index + 1, lazy, eager, url);
                image.alt_text = attrs.attr("alt").unwrap_or_default().trim().to_string();
                image.title_text = attrs.attr("title").unwrap_or_default().trim().to_string();
                image
            })
            .collect()
    }
}

fn non_empty_attr(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Extract with the default base host.
#[must_use]
pub fn extract_article(markup: &str) -> ArticleRecord {
    ContentExtractor::default().extract(markup)
}
