//! Getter methods for `ScrapeConfig`

use std::path::PathBuf;
use std::time::Duration;

use super::types::ScrapeConfig;

impl ScrapeConfig {
    #[must_use]
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn image_loading(&self) -> bool {
        self.image_loading
    }

    #[must_use]
    pub fn download_images(&self) -> bool {
        self.download_images
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }

    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        self.page_load_timeout
    }

    #[must_use]
    pub fn ready_timeout(&self) -> Duration {
        self.ready_timeout
    }

    #[must_use]
    pub fn settle_interval(&self) -> Duration {
        self.settle_interval
    }

    #[must_use]
    pub fn top_settle_interval(&self) -> Duration {
        self.top_settle_interval
    }

    #[must_use]
    pub fn max_scroll_rounds(&self) -> u32 {
        self.max_scroll_rounds
    }

    #[must_use]
    pub fn image_timeout(&self) -> Duration {
        self.image_timeout
    }

    #[must_use]
    pub fn max_image_size(&self) -> usize {
        self.max_image_size
    }

    #[must_use]
    pub fn image_concurrency(&self) -> usize {
        self.image_concurrency
    }

    #[must_use]
    pub fn base_host(&self) -> &str {
        &self.base_host
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    #[must_use]
    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }
}
