//! Image localization
//!
//! Resolves each `ImageRef` to bytes (HTTP or inline data), writes them into
//! the article's image directory and records the outcome on the ref itself.
//! One failure never aborts the batch.

pub mod downloaders;
pub mod types;

use anyhow::{Context, Result};
use futures::StreamExt;
use futures::stream;
use once_cell::sync::OnceCell;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::path::Path;

pub use downloaders::{ImageDownloadConfig, decode_data_url, download_image, extension_for};
pub use types::{FetchSummary, FetchedImage};

use crate::config::ScrapeConfig;
use crate::page_extractor::ImageRef;
use crate::utils::{self, is_data_url};

/// Fetches article images with bounded concurrency.
///
/// The HTTP client is built on first use and shared by every later batch.
#[derive(Debug)]
pub struct ImagePipeline {
    config: ImageDownloadConfig,
    concurrency: usize,
    user_agent: String,
    client: OnceCell<Client>,
}

impl ImagePipeline {
    #[must_use]
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            config: ImageDownloadConfig {
                timeout: config.image_timeout(),
                max_size: config.max_image_size(),
            },
            concurrency: config.image_concurrency().max(1),
            user_agent: config.user_agent().to_string(),
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| {
            let mut headers = HeaderMap::new();
            headers.insert(
                ACCEPT_LANGUAGE,
                HeaderValue::from_static(utils::ACCEPT_LANGUAGE),
            );
            Client::builder()
                .user_agent(self.user_agent.clone())
                .default_headers(headers)
                .build()
                .context("Failed to build image HTTP client")
        })
    }

    /// Fetch every image into `dest_dir`, mutating each ref exactly once.
    ///
    /// A no-op when `enabled` is false. `dest_dir` is only created once the
    /// first image is about to be written.
    pub async fn fetch_all(
        &self,
        images: &mut [ImageRef],
        dest_dir: &Path,
        enabled: bool,
    ) -> FetchSummary {
        if !enabled {
            log::debug!("Image downloading disabled, skipping {} images", images.len());
            return FetchSummary::skipped(images.len());
        }
        if images.is_empty() {
            return FetchSummary::default();
        }

        let client = match self.client() {
            Ok(client) => client.clone(),
            Err(e) => {
                let message = format!("{e:#}");
                for image in images.iter_mut() {
                    image.mark_failed(message.clone());
                }
                return self.summarize(images);
            }
        };

        let jobs: Vec<(usize, usize, Option<String>)> = images
            .iter()
            .enumerate()
            .map(|(index, image)| (index, image.position, image.url.clone()))
            .collect();

        let results: Vec<(usize, Result<String>)> = stream::iter(jobs)
            .map(|(index, position, url)| {
                let client = &client;
                async move { (index, self.fetch_one(client, position, url, dest_dir).await) }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (index, result) in results {
            let image = &mut images[index];
            match result {
                Ok(file_name) => image.mark_downloaded(file_name),
                Err(e) => {
                    log::warn!(
                        "Image {} ({}) failed: {e:#}",
                        image.position,
                        image.url.as_deref().unwrap_or("no source")
                    );
                    image.mark_failed(format!("{e:#}"));
                }
            }
        }

        self.summarize(images)
    }

    fn summarize(&self, images: &[ImageRef]) -> FetchSummary {
        let downloaded = images.iter().filter(|img| img.downloaded).count();
        let summary = FetchSummary {
            total: images.len(),
            downloaded,
            failed: images.len() - downloaded,
            skipped: false,
        };
        log::info!("Downloaded {} images", summary.ratio_label());
        summary
    }

    async fn fetch_one(
        &self,
        client: &Client,
        position: usize,
        url: Option<String>,
        dest_dir: &Path,
    ) -> Result<String> {
        let url = url.ok_or_else(|| anyhow::anyhow!("missing image source"))?;

        let fetched = if is_data_url(&url) {
            FetchedImage {
                bytes: decode_data_url(&url)?,
                extension: ".png".to_string(),
            }
        } else {
            download_image(client, &url, &self.config).await?
        };

        let file_name = format!(
            "img_{position}_{}{}",
            chrono::Local::now().timestamp_millis(),
            fetched.extension
        );

        tokio::fs::create_dir_all(dest_dir)
            .await
            .with_context(|| format!("Failed to create image directory {}", dest_dir.display()))?;
        let path = dest_dir.join(&file_name);
        tokio::fs::write(&path, &fetched.bytes)
            .await
            .with_context(|| format!("Failed to write image {}", path.display()))?;

        log::debug!("Saved image {position} to {}", path.display());
        Ok(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_DATA_URL: &str = "data:image/jpeg;base64,iVBORw0KGgo=";

    fn image(position: usize, url: Option<&str>) -> ImageRef {
        ImageRef::new(position, url.map(str::to_string), None, url.map(str::to_string))
    }

    #[tokio::test]
    async fn disabled_pipeline_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("images");
        let mut images = vec![image(1, Some(PNG_DATA_URL))];

        let summary = ImagePipeline::new(&ScrapeConfig::default())
            .fetch_all(&mut images, &dest, false)
            .await;

        assert!(summary.skipped);
        assert!(!dest.exists());
        assert!(!images[0].downloaded);
        assert!(images[0].error.is_none());
    }

    #[tokio::test]
    async fn data_url_is_written_as_png_without_http() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("images");
        let mut images = vec![image(1, Some(PNG_DATA_URL))];

        let summary = ImagePipeline::new(&ScrapeConfig::default())
            .fetch_all(&mut images, &dest, true)
            .await;

        assert_eq!(summary.downloaded, 1);
        let name = images[0].local_file_name.clone().unwrap();
        assert!(name.starts_with("img_1_"));
        assert!(name.ends_with(".png"));
        assert_eq!(std::fs::read(dest.join(name)).unwrap(), b"\x89PNG\r\n\x1a\n");
    }

    #[tokio::test]
    async fn missing_source_is_recorded_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("images");
        let mut images = vec![image(1, None)];

        let summary = ImagePipeline::new(&ScrapeConfig::default())
            .fetch_all(&mut images, &dest, true)
            .await;

        assert_eq!(summary.failed, 1);
        assert_eq!(images[0].error.as_deref(), Some("missing image source"));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn http_results_land_at_their_own_index() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("GET", "/ok.gif")
            .with_status(200)
            .with_header("content-type", "image/gif")
            .with_body("GIF89a")
            .create_async()
            .await;
        let missing = server
            .mock("GET", "/missing.png")
            .with_status(404)
            .expect(2)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("images");
        let ok_url = format!("{}/ok.gif", server.url());
        let missing_url = format!("{}/missing.png", server.url());
        let mut images = vec![
            image(1, Some(&missing_url)),
            image(2, Some(&ok_url)),
            image(3, Some(&missing_url)),
        ];

        let summary = ImagePipeline::new(&ScrapeConfig::default())
            .fetch_all(&mut images, &dest, true)
            .await;

        assert_eq!(summary, FetchSummary { total: 3, downloaded: 1, failed: 2, skipped: false });
        assert!(!images[0].downloaded);
        assert!(images[0].error.as_deref().unwrap().contains("404"));
        assert!(images[1].downloaded);
        assert!(images[1].local_file_name.as_deref().unwrap().ends_with(".gif"));
        assert!(!images[2].downloaded);

        ok.assert_async().await;
        missing.assert_async().await;
    }
}
