//! Fluent builder for `ScrapeConfig`
//!
//! Every field has a default, so `ScrapeConfig::builder().build()` is valid.
//! `build()` only rejects values that would make the pipeline spin or stall.

use anyhow::{Result, anyhow};
use std::path::PathBuf;
use std::time::Duration;

use super::types::ScrapeConfig;
use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_BASE_HOST, DEFAULT_IMAGE_CONCURRENCY, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_MAX_IMAGE_SIZE, DEFAULT_MAX_SCROLL_ROUNDS, DEFAULT_OUTPUT_DIR, DEFAULT_WINDOW_HEIGHT,
    DEFAULT_WINDOW_WIDTH,
};

pub struct ScrapeConfigBuilder {
    output_dir: PathBuf,
    headless: bool,
    image_loading: bool,
    download_images: bool,
    max_attempts: u32,
    retry_backoff: Duration,
    page_load_timeout: Duration,
    ready_timeout: Duration,
    settle_interval: Duration,
    top_settle_interval: Duration,
    max_scroll_rounds: u32,
    image_timeout: Duration,
    max_image_size: usize,
    image_concurrency: usize,
    base_host: String,
    user_agent: String,
    window_size: (u32, u32),
}

impl Default for ScrapeConfigBuilder {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            headless: true,
            image_loading: true,
            download_images: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: Duration::from_secs(2),
            page_load_timeout: Duration::from_secs(30),
            ready_timeout: Duration::from_secs(10),
            settle_interval: Duration::from_secs(2),
            top_settle_interval: Duration::from_secs(1),
            max_scroll_rounds: DEFAULT_MAX_SCROLL_ROUNDS,
            image_timeout: Duration::from_secs(30),
            max_image_size: DEFAULT_MAX_IMAGE_SIZE,
            image_concurrency: DEFAULT_IMAGE_CONCURRENCY,
            base_host: DEFAULT_BASE_HOST.to_string(),
            user_agent: CHROME_USER_AGENT.to_string(),
            window_size: (DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT),
        }
    }
}

impl ScrapeConfig {
    /// Create a builder for configuring a `ScrapeConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ScrapeConfigBuilder {
        ScrapeConfigBuilder::default()
    }
}

impl ScrapeConfigBuilder {
    /// Root directory for saved articles
    ///
    /// # Example
    ///
    /// ```rust
    /// # use kodegen_tools_articlescrape::config::ScrapeConfig;
    /// let config = ScrapeConfig::builder()
    ///     .output_dir("/tmp/articles")
    ///     .build()?;
    /// assert_eq!(config.output_dir().to_str(), Some("/tmp/articles"));
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Run the browser without a visible window (default: true)
    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn image_loading(mut self, enabled: bool) -> Self {
        self.image_loading = enabled;
        self
    }

    /// Default for requests that don't say otherwise
    #[must_use]
    pub fn download_images(mut self, enabled: bool) -> Self {
        self.download_images = enabled;
        self
    }

    /// Total retrieval attempts per URL, including the first (default: 3)
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    #[must_use]
    pub fn page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    #[must_use]
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = timeout;
        self
    }

    /// Wait between scroll rounds while lazy content loads (default: 2s)
    #[must_use]
    pub fn settle_interval(mut self, interval: Duration) -> Self {
        self.settle_interval = interval;
        self
    }

    #[must_use]
    pub fn top_settle_interval(mut self, interval: Duration) -> Self {
        self.top_settle_interval = interval;
        self
    }

    #[must_use]
    pub fn max_scroll_rounds(mut self, rounds: u32) -> Self {
        self.max_scroll_rounds = rounds;
        self
    }

    #[must_use]
    pub fn image_timeout(mut self, timeout: Duration) -> Self {
        self.image_timeout = timeout;
        self
    }

    #[must_use]
    pub fn max_image_size(mut self, bytes: usize) -> Self {
        self.max_image_size = bytes;
        self
    }

    /// Parallel image downloads per article (default: 4)
    #[must_use]
    pub fn image_concurrency(mut self, workers: usize) -> Self {
        self.image_concurrency = workers;
        self
    }

    #[must_use]
    pub fn base_host(mut self, host: impl Into<String>) -> Self {
        self.base_host = host.into();
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    /// Validate and produce the config
    ///
    /// # Errors
    ///
    /// Returns an error if `max_attempts` or `image_concurrency` is zero, or if
    /// `base_host` is not an absolute http(s) URL.
    pub fn build(self) -> Result<ScrapeConfig> {
        if self.max_attempts == 0 {
            return Err(anyhow!("max_attempts must be at least 1"));
        }
        if self.image_concurrency == 0 {
            return Err(anyhow!("image_concurrency must be at least 1"));
        }
        if !crate::utils::is_valid_url(&self.base_host) {
            return Err(anyhow!("base_host must be an http(s) URL, got '{}'", self.base_host));
        }
        Ok(self.into_config())
    }

    pub(crate) fn into_config(self) -> ScrapeConfig {
        ScrapeConfig {
            output_dir: self.output_dir,
            headless: self.headless,
            image_loading: self.image_loading,
            download_images: self.download_images,
            max_attempts: self.max_attempts,
            retry_backoff: self.retry_backoff,
            page_load_timeout: self.page_load_timeout,
            ready_timeout: self.ready_timeout,
            settle_interval: self.settle_interval,
            top_settle_interval: self.top_settle_interval,
            max_scroll_rounds: self.max_scroll_rounds,
            image_timeout: self.image_timeout,
            max_image_size: self.max_image_size,
            image_concurrency: self.image_concurrency,
            base_host: self.base_host,
            user_agent: self.user_agent,
            window_size: self.window_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ScrapeConfig::default();
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.ready_timeout(), Duration::from_secs(10));
        assert_eq!(config.settle_interval(), Duration::from_secs(2));
        assert_eq!(config.window_size(), (1920, 1080));
        assert_eq!(config.output_dir(), &PathBuf::from("articles"));
        assert!(config.headless());
        assert!(config.download_images());
    }

    #[test]
    fn zero_attempts_is_rejected() {
        assert!(ScrapeConfig::builder().max_attempts(0).build().is_err());
        assert!(ScrapeConfig::builder().image_concurrency(0).build().is_err());
        assert!(ScrapeConfig::builder().base_host("mp.weixin.qq.com").build().is_err());
    }
}
