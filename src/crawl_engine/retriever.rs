//! Retry-tolerant page retrieval
//!
//! One attempt is: navigate, wait for the body, scroll until the document
//! height stops growing, scroll back to the top, read the markup. Any engine
//! error fails the attempt. A page that renders but has no recognizable
//! structure is not an error; extraction degrades instead.

use anyhow::Context;
use chrono::Local;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::crawl_types::{RetrievalAttempt, ScrapeError, ScrapeResult};
use crate::config::ScrapeConfig;
use crate::engine::RenderEngine;
use crate::page_extractor::{ArticleRecord, ContentExtractor};

#[derive(Debug, Clone)]
pub struct PageRetriever {
    extractor: ContentExtractor,
    max_attempts: u32,
    retry_backoff: Duration,
    ready_timeout: Duration,
    settle_interval: Duration,
    top_settle_interval: Duration,
    max_scroll_rounds: u32,
}

impl PageRetriever {
    #[must_use]
    pub fn new(config: &ScrapeConfig) -> Self {
        Self {
            extractor: ContentExtractor::new(config.base_host()),
            max_attempts: config.max_attempts(),
            retry_backoff: config.retry_backoff(),
            ready_timeout: config.ready_timeout(),
            settle_interval: config.settle_interval(),
            top_settle_interval: config.top_settle_interval(),
            max_scroll_rounds: config.max_scroll_rounds(),
        }
    }

    /// Override the attempt budget for this retriever.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Retrieve and extract the article at `url`.
    ///
    /// `deadline` bounds the whole retrieval, retries and backoff included.
    ///
    /// # Errors
    ///
    /// `RetrievalFailed` once every attempt has failed or the deadline passed.
    pub async fn retrieve(
        &self,
        engine: &mut dyn RenderEngine,
        url: &str,
        deadline: Option<Instant>,
    ) -> ScrapeResult<ArticleRecord> {
        let mut attempt = RetrievalAttempt::new(self.max_attempts);

        let outcome = match deadline {
            Some(deadline) => {
                tokio::time::timeout_at(deadline, self.run_attempts(engine, url, &mut attempt))
                    .await
            }
            None => Ok(self.run_attempts(engine, url, &mut attempt).await),
        };

        match outcome {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Retrieval of {url} cancelled by deadline during attempt {}",
                    attempt.index
                );
                Err(ScrapeError::RetrievalFailed {
                    url: url.to_string(),
                    attempts: attempt.index,
                    cause: match attempt.last_failure {
                        Some(last) => format!("deadline exceeded (last failure: {last})"),
                        None => "deadline exceeded".to_string(),
                    },
                })
            }
        }
    }

    async fn run_attempts(
        &self,
        engine: &mut dyn RenderEngine,
        url: &str,
        attempt: &mut RetrievalAttempt,
    ) -> ScrapeResult<ArticleRecord> {
        while attempt.begin_next() {
            debug!(
                "Retrieving {url} (attempt {}/{})",
                attempt.index, attempt.max_attempts
            );

            match self.render(engine, url).await {
                Ok(markup) => {
                    let mut record = self.extractor.extract(&markup);
                    record.stamp_provenance(url, Local::now());
                    info!(
                        "Retrieved '{}' from {url}: {} chars, {} images",
                        record.title, record.word_count, record.image_count
                    );
                    return Ok(record);
                }
                Err(e) => {
                    warn!(
                        "Retrieval attempt {}/{} for {url} failed: {e:#}",
                        attempt.index, attempt.max_attempts
                    );
                    attempt.record_failure(&e);
                    if attempt.has_remaining() {
                        tokio::time::sleep(self.retry_backoff).await;
                    }
                }
            }
        }

        Err(attempt.to_error(url))
    }

    async fn render(&self, engine: &mut dyn RenderEngine, url: &str) -> anyhow::Result<String> {
        engine.navigate(url).await.context("navigation failed")?;
        engine
            .wait_for_ready(self.ready_timeout)
            .await
            .context("page never became ready")?;
        self.scroll_until_stable(engine)
            .await
            .context("scrolling failed")?;
        engine
            .page_markup()
            .await
            .context("reading rendered markup failed")
    }

    /// Scroll to the bottom until the height stops changing, then back to top.
    ///
    /// Returns the number of scroll rounds performed.
    async fn scroll_until_stable(&self, engine: &mut dyn RenderEngine) -> anyhow::Result<u32> {
        let mut last_height = engine.document_height().await?;
        let mut rounds = 0;

        while rounds < self.max_scroll_rounds {
            engine.scroll_to(last_height).await?;
            tokio::time::sleep(self.settle_interval).await;
            rounds += 1;

            let height = engine.document_height().await?;
            if height == last_height {
                break;
            }
            last_height = height;
        }

        if rounds == self.max_scroll_rounds {
            debug!("Stopped scrolling after {rounds} rounds; page is still growing");
        }

        engine.scroll_to(0).await?;
        tokio::time::sleep(self.top_settle_interval).await;
        Ok(rounds)
    }
}
