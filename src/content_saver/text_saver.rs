use std::fmt::Write as _;
use std::path::Path;

use crate::crawl_engine::crawl_types::{ScrapeError, ScrapeResult};
use crate::page_extractor::ArticleRecord;

/// Timestamp layout used in human-readable headers
pub const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the plain-text form: fixed metadata header, rule, then body text.
#[must_use]
pub fn render_text(record: &ArticleRecord) -> String {
    let retrieved = record
        .retrieved_at
        .map(|t| t.format(DISPLAY_TIME_FORMAT).to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut out = String::with_capacity(record.body_text.len() + 512);
    let _ = writeln!(out, "Title: {}", record.title);
    let _ = writeln!(out, "Author: {}", record.author);
    let _ = writeln!(out, "Published: {}", record.publish_time);
    let _ = writeln!(out, "Retrieved: {retrieved}");
    let _ = writeln!(out, "Word count: {}", record.word_count);
    let _ = writeln!(out, "Image count: {}", record.images.len());
    let _ = writeln!(out, "URL: {}", record.source_url.as_deref().unwrap_or_default());
    let _ = writeln!(out, "{}", "-".repeat(50));
    out.push_str(&record.body_text);
    out
}

pub async fn save_text(record: &ArticleRecord, path: &Path) -> ScrapeResult<()> {
    tokio::fs::write(path, render_text(record))
        .await
        .map_err(|e| ScrapeError::persistence(path, e))?;
    log::debug!("Saved article text to {}", path.display());
    Ok(())
}
