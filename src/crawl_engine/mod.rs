//! Crawl Engine Module
//!
//! Retrieval, retry bookkeeping and the end-to-end scrape pipeline that ties
//! the engine, the extractor and the writer together.

pub mod crawl_types;
pub mod orchestrator;
pub mod outcome;
pub mod page_timeout;
pub mod retriever;

pub use crawl_types::{RetrievalAttempt, ScrapeError, ScrapeResult};
pub use orchestrator::{ArticleScraper, ScrapeOutcome, ScrapeRequest};
pub use outcome::{ArticleSummary, ScrapeReport};
pub use page_timeout::with_page_timeout;
pub use retriever::PageRetriever;
