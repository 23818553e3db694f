//! Article extraction
//!
//! Parses a rendered page into an `ArticleRecord` using ordered
//! selector-fallback lists, and enumerates the body's images.

pub mod extractors;
pub mod schema;
pub mod selectors;

pub use extractors::{ContentExtractor, extract_article};
pub use schema::{ArticleRecord, ImageRef};
