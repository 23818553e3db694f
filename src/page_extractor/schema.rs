use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// One `<img>` found inside the article body, in document order.
///
/// Position and source URLs are the image's only identity; there is no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// 1-based ordinal among the body's image elements
    pub position: usize,
    pub alt_text: String,
    pub title_text: String,
    /// Lazy-load attribute (`data-src`), as written in the markup
    pub primary_source_url: Option<String>,
    /// Eager `src` attribute, as written in the markup
    pub fallback_source_url: Option<String>,
    /// Effective absolute URL: primary if present, else fallback, normalized
    pub url: Option<String>,
    pub downloaded: bool,
    pub local_file_name: Option<String>,
    pub error: Option<String>,
}

impl ImageRef {
    #[must_use]
    pub fn new(
        position: usize,
        primary_source_url: Option<String>,
        fallback_source_url: Option<String>,
        url: Option<String>,
    ) -> Self {
        Self {
            position,
            alt_text: String::new(),
            title_text: String::new(),
            primary_source_url,
            fallback_source_url,
            url,
            downloaded: false,
            local_file_name: None,
            error: None,
        }
    }

    /// Record a successful download. Clears any earlier error.
    pub fn mark_downloaded(&mut self, file_name: impl Into<String>) {
        self.downloaded = true;
        self.local_file_name = Some(file_name.into());
        self.error = None;
    }

    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.downloaded = false;
        self.local_file_name = None;
        self.error = Some(error.into());
    }

    /// True when `candidate` is one of this image's stored source URLs.
    #[must_use]
    pub fn matches_source(&self, candidate: &str) -> bool {
        [&self.url, &self.primary_source_url, &self.fallback_source_url]
            .into_iter()
            .flatten()
            .any(|source| source == candidate)
    }

    /// Extension of the saved file, if any (e.g. `png`)
    #[must_use]
    pub fn file_extension(&self) -> Option<&str> {
        self.local_file_name
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext)
    }
}

/// The structured record extracted from one rendered article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub author: String,
    pub publish_time: String,
    /// Plain text, one line per text block
    pub body_text: String,
    /// Outer HTML of the body element; image paths are rewritten before saving
    pub body_html: String,
    pub images: Vec<ImageRef>,
    /// Character count of `body_text`
    pub word_count: usize,
    pub image_count: usize,
    pub source_url: Option<String>,
    pub retrieved_at: Option<DateTime<Local>>,
}

impl ArticleRecord {
    /// Number of images with `downloaded == true`
    #[must_use]
    pub fn downloaded_images(&self) -> usize {
        self.images.iter().filter(|img| img.downloaded).count()
    }

    /// Provenance is stamped once, after a successful retrieval.
    pub fn stamp_provenance(&mut self, source_url: &str, retrieved_at: DateTime<Local>) {
        self.source_url = Some(source_url.to_string());
        self.retrieved_at = Some(retrieved_at);
    }
}
