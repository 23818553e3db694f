//! Core configuration type for article scraping
//!
//! `ScrapeConfig` carries every tunable used by the engine factory, the
//! retriever, the image pipeline and the writer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration struct for article scraping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Root under which `<base>_<yyyymmdd_HHMMSS>/` article directories are created
    pub(crate) output_dir: PathBuf,
    pub(crate) headless: bool,

    /// Let the browser load images while rendering.
    ///
    /// `ArticleScraper` also turns it off when `download_images` is false.
    pub(crate) image_loading: bool,
    pub(crate) download_images: bool,

    pub(crate) max_attempts: u32,
    pub(crate) retry_backoff: Duration,

    /// Timeout for `page.goto()`
    pub(crate) page_load_timeout: Duration,
    /// How long to wait for `document.body` after navigation
    pub(crate) ready_timeout: Duration,
    /// Pause after each scroll-to-bottom before re-measuring document height
    pub(crate) settle_interval: Duration,
    /// Pause after scrolling back to the top
    pub(crate) top_settle_interval: Duration,
    pub(crate) max_scroll_rounds: u32,

    pub(crate) image_timeout: Duration,
    pub(crate) max_image_size: usize,
    pub(crate) image_concurrency: usize,

    /// Host joined onto host-relative image URLs
    pub(crate) base_host: String,
    pub(crate) user_agent: String,
    pub(crate) window_size: (u32, u32),
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        super::builder::ScrapeConfigBuilder::default().into_config()
    }
}
