//! End-to-end article scrape: lease engine, retrieve, persist.
//!
//! The engine lease is held only for retrieval. Image downloads and file
//! writes run after it is released so the next request can start rendering.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use super::crawl_types::ScrapeResult;
use super::retriever::PageRetriever;
use crate::config::ScrapeConfig;
use crate::content_saver::{ArticleWriter, SaveResult};
use crate::engine::{EngineFactory, EngineLauncher, EngineManager, EngineState};
use crate::page_extractor::ArticleRecord;

/// One article request.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub url: String,
    /// `None` follows the scraper's `ScrapeConfig::download_images`
    pub download_images: Option<bool>,
    pub custom_base_name: Option<String>,
    /// Bound on retrieval, retries included; persistence is not covered
    pub deadline: Option<Duration>,
}

impl ScrapeRequest {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            download_images: None,
            custom_base_name: None,
            deadline: None,
        }
    }

    #[must_use]
    pub fn download_images(mut self, enabled: bool) -> Self {
        self.download_images = Some(enabled);
        self
    }

    #[must_use]
    pub fn custom_base_name(mut self, name: impl Into<String>) -> Self {
        self.custom_base_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// The final record (rewritten body, image statuses) and where it was saved
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub record: ArticleRecord,
    pub saved: SaveResult,
}

pub struct ArticleScraper {
    engines: EngineManager,
    download_images: bool,
    retriever: PageRetriever,
    writer: ArticleWriter,
}

impl ArticleScraper {
    /// Scraper backed by a real Chromium engine, launched on first use.
    #[must_use]
    pub fn new(config: &ScrapeConfig) -> Self {
        Self::with_launcher(config, Arc::new(EngineFactory::new(config.clone())))
    }

    /// A config with `download_images(false)` also renders without images,
    /// since nothing would be saved from them.
    #[must_use]
    pub fn with_launcher(config: &ScrapeConfig, launcher: Arc<dyn EngineLauncher>) -> Self {
        let image_loading = config.image_loading() && config.download_images();
        Self {
            engines: EngineManager::new(launcher, config.headless(), image_loading),
            download_images: config.download_images(),
            retriever: PageRetriever::new(config),
            writer: ArticleWriter::new(config),
        }
    }

    pub async fn engine_state(&self) -> EngineState {
        self.engines.state().await
    }

    /// Retrieve, extract and persist one article.
    ///
    /// # Errors
    ///
    /// `EngineUnavailable`, `RetrievalFailed` or a persistence error. Image
    /// download failures are reported on the record, not here.
    pub async fn scrape(&self, request: &ScrapeRequest) -> ScrapeResult<ScrapeOutcome> {
        let deadline = request.deadline.map(|d| Instant::now() + d);

        let mut record = {
            let mut lease = self.engines.lease().await?;
            let result = self
                .retriever
                .retrieve(lease.engine()?, &request.url, deadline)
                .await;

            if result.is_err() && !lease.engine()?.is_alive().await {
                warn!("Engine died during retrieval of {}", request.url);
                lease.mark_dead().await;
            }
            result?
        };

        let saved = self
            .writer
            .save(
                &mut record,
                request.custom_base_name.as_deref(),
                request.download_images.unwrap_or(self.download_images),
            )
            .await?;

        info!(
            "Scraped {} into {}",
            request.url,
            saved.article_dir.display()
        );
        Ok(ScrapeOutcome { record, saved })
    }

    /// Tear down the engine. Further scrapes fail with `EngineUnavailable`.
    pub async fn shutdown(&self) {
        self.engines.shutdown().await;
    }
}
