pub mod analysis;
pub mod browser_setup;
pub mod config;
pub mod content_saver;
pub mod crawl_engine;
pub mod engine;
pub mod image_pipeline;
pub mod image_rewriter;
pub mod page_extractor;
pub mod utils;

pub use analysis::{ArticleStatistics, Keyword, extract_keywords};
pub use browser_setup::{download_managed_browser, find_browser_executable, launch_browser};
pub use config::{ScrapeConfig, ScrapeConfigBuilder};
pub use content_saver::{ArticleWriter, SaveResult, load_record_json};
pub use crawl_engine::{
    ArticleScraper, ArticleSummary, PageRetriever, ScrapeError, ScrapeOutcome, ScrapeReport,
    ScrapeRequest, ScrapeResult,
};
pub use engine::{
    ChromiumEngine, EngineFactory, EngineLauncher, EngineManager, EngineState, RenderEngine,
};
pub use image_pipeline::{FetchSummary, ImagePipeline};
pub use image_rewriter::rewrite_images;
pub use page_extractor::{ArticleRecord, ContentExtractor, ImageRef, extract_article};

/// Retrieve and save one article with a throwaway scraper.
///
/// The engine is shut down before returning, whatever the outcome.
///
/// # Errors
///
/// See [`ArticleScraper::scrape`].
pub async fn scrape_article(config: &ScrapeConfig, request: &ScrapeRequest) -> ScrapeResult<ScrapeOutcome> {
    let scraper = ArticleScraper::new(config);
    let result = scraper.scrape(request).await;
    scraper.shutdown().await;
    result
}
