//! Article persistence
//!
//! Each article gets its own `<base>_<yyyymmdd_HHMMSS>/` directory holding a
//! JSON record, a plain-text file, a self-contained HTML file and, when any
//! image was downloaded, an `images/` directory.
//!
//! Write order matters: text first (it needs no image data), then image
//! downloads, then JSON (so image statuses are final), then the HTML rewrite
//! and the HTML file.

pub mod html_saver;
pub mod json_saver;
pub mod text_saver;

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use html_saver::{render_html, save_html};
pub use json_saver::{load_record_json, save_record_json};
pub use text_saver::{render_text, save_text};

use crate::config::ScrapeConfig;
use crate::crawl_engine::crawl_types::{ScrapeError, ScrapeResult};
use crate::image_pipeline::{FetchSummary, ImagePipeline};
use crate::image_rewriter::rewrite_images;
use crate::page_extractor::ArticleRecord;
use crate::utils::{IMAGES_DIR_NAME, sanitize_base_name, title_to_base_name};

/// Paths produced by one `save`, so callers never re-derive them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResult {
    pub article_dir: PathBuf,
    pub json_path: PathBuf,
    pub text_path: PathBuf,
    pub html_path: PathBuf,
    /// Present only if at least one image was written
    pub images_dir: Option<PathBuf>,
    pub images: FetchSummary,
}

impl SaveResult {
    /// Every saved artifact, in write order.
    #[must_use]
    pub fn saved_paths(&self) -> Vec<&Path> {
        let mut paths = vec![
            self.text_path.as_path(),
            self.json_path.as_path(),
            self.html_path.as_path(),
        ];
        if let Some(dir) = &self.images_dir {
            paths.push(dir.as_path());
        }
        paths
    }
}

/// Derive the base name: a sanitized custom name, else one built from the title.
#[must_use]
pub fn base_name_for(record: &ArticleRecord, custom_base_name: Option<&str>) -> String {
    match custom_base_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => sanitize_base_name(name),
        None => title_to_base_name(&record.title),
    }
}

/// Writes articles under a root output directory.
#[derive(Debug)]
pub struct ArticleWriter {
    output_dir: PathBuf,
    images: ImagePipeline,
}

impl ArticleWriter {
    #[must_use]
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            output_dir: config.output_dir().clone(),
            images: ImagePipeline::new(config),
        }
    }

    /// Persist `record`, downloading its images when `download_images` is set.
    ///
    /// `record.images` and `record.body_html` are updated in place.
    ///
    /// # Errors
    ///
    /// Filesystem failures are returned as-is and never retried. Image
    /// failures are recorded on the record and do not fail the save.
    pub async fn save(
        &self,
        record: &mut ArticleRecord,
        custom_base_name: Option<&str>,
        download_images: bool,
    ) -> ScrapeResult<SaveResult> {
        let base = base_name_for(record, custom_base_name);
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let article_dir = self.output_dir.join(format!("{base}_{stamp}"));

        tokio::fs::create_dir_all(&article_dir)
            .await
            .map_err(|e| ScrapeError::persistence(&article_dir, e))?;

        let text_path = article_dir.join(format!("{base}.txt"));
        save_text(record, &text_path).await?;

        let images_dir = article_dir.join(IMAGES_DIR_NAME);
        let images = self
            .images
            .fetch_all(&mut record.images, &images_dir, download_images)
            .await;

        let json_path = article_dir.join(format!("{base}.json"));
        save_record_json(record, &json_path).await?;

        record.body_html = rewrite_images(&record.body_html, &record.images)
            .map_err(|e| ScrapeError::Rewrite(format!("{e:#}")))?;

        let html_path = article_dir.join(format!("{base}.html"));
        save_html(record, &html_path).await?;

        log::info!(
            "Saved '{}' to {} ({} images downloaded)",
            record.title,
            article_dir.display(),
            images.ratio_label()
        );

        Ok(SaveResult {
            article_dir,
            json_path,
            text_path,
            html_path,
            images_dir: (images.downloaded > 0).then_some(images_dir),
            images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_extractor::extract_article;

    const PAGE: &str = r#"<html><body>
        <h1 id="activity-name">Rust 周报: 第 42 期</h1>
        <div id="js_content"><p>正文内容</p><img src="https://remote.test/pic.png" alt="diagram"></div>
    </body></html>"#;

    fn writer(root: &Path) -> ArticleWriter {
        let config = ScrapeConfig::builder()
            .output_dir(root)
            .build()
            .unwrap();
        ArticleWriter::new(&config)
    }

    #[test]
    fn custom_name_wins_over_title() {
        let record = extract_article(PAGE);
        assert_eq!(base_name_for(&record, None), "Rust-周报-第-42-期");
        assert_eq!(base_name_for(&record, Some("weekly")), "weekly");
        assert_eq!(base_name_for(&record, Some("  ")), "Rust-周报-第-42-期");
    }

    #[tokio::test]
    async fn disabled_downloads_write_three_files_and_no_image_dir() {
        let root = tempfile::tempdir().unwrap();
        let mut record = extract_article(PAGE);

        let saved = writer(root.path())
            .save(&mut record, Some("issue-42"), false)
            .await
            .unwrap();

        assert!(saved.images_dir.is_none());
        assert!(!saved.article_dir.join("images").exists());
        assert_eq!(std::fs::read_dir(&saved.article_dir).unwrap().count(), 3);
        assert!(saved.article_dir.file_name().unwrap().to_str().unwrap().starts_with("issue-42_"));
        assert_eq!(saved.json_path.file_name().unwrap(), "issue-42.json");

        let html = std::fs::read_to_string(&saved.html_path).unwrap();
        assert!(html.contains("Image failed to load: diagram"));
        assert!(!html.contains("remote.test"));
    }

    #[tokio::test]
    async fn text_file_has_header_then_body() {
        let root = tempfile::tempdir().unwrap();
        let mut record = extract_article(PAGE);
        record.stamp_provenance("https://mp.weixin.qq.com/s/abc", Local::now());

        let saved = writer(root.path()).save(&mut record, None, false).await.unwrap();
        let text = std::fs::read_to_string(&saved.text_path).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Title: Rust 周报: 第 42 期");
        assert_eq!(lines[5], "Image count: 1");
        assert_eq!(lines[6], "URL: https://mp.weixin.qq.com/s/abc");
        assert_eq!(lines[7], "-".repeat(50));
        assert_eq!(lines[8], "正文内容");
        assert!(text.ends_with("正文内容"));
    }

    #[tokio::test]
    async fn json_round_trips_with_image_status() {
        let root = tempfile::tempdir().unwrap();
        let mut record = extract_article(PAGE);

        let saved = writer(root.path()).save(&mut record, None, false).await.unwrap();
        let raw = std::fs::read_to_string(&saved.json_path).unwrap();
        assert!(raw.contains("正文内容"), "non-ASCII text must not be escaped");

        let loaded = load_record_json(&saved.json_path).await.unwrap();
        assert_eq!(loaded.title, record.title);
        assert_eq!(loaded.images.len(), 1);
        assert!(!loaded.images[0].downloaded);
    }

    #[tokio::test]
    async fn unwritable_root_is_a_persistence_error() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let mut record = extract_article(PAGE);
        let err = writer(&blocker).save(&mut record, None, false).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Persistence { .. }));
    }
}
