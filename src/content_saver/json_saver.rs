use std::path::Path;
use std::time::Duration;
use tokio::time::timeout;

use crate::crawl_engine::crawl_types::{ScrapeError, ScrapeResult};
use crate::page_extractor::ArticleRecord;

/// Timeout for blocking JSON serialization
/// Prevents hangs on pathological data structures
const BLOCKING_SERIALIZATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Save the full record, image statuses included, as pretty-printed JSON.
///
/// Non-ASCII text is written as-is, not escaped.
pub async fn save_record_json(record: &ArticleRecord, path: &Path) -> ScrapeResult<()> {
    let record = record.clone();

    // CPU-bound for long articles, keep it off the runtime threads
    let blocking_task = tokio::task::spawn_blocking(move || serde_json::to_string_pretty(&record));

    let json_str = match timeout(BLOCKING_SERIALIZATION_TIMEOUT, blocking_task).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => {
            return Err(ScrapeError::persistence(
                path,
                std::io::Error::other(format!("JSON serialization task panicked: {e}")),
            ));
        }
        Err(_) => {
            log::warn!("JSON serialization timeout (timeout: {BLOCKING_SERIALIZATION_TIMEOUT:?})");
            return Err(ScrapeError::persistence(
                path,
                std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("JSON serialization timed out after {BLOCKING_SERIALIZATION_TIMEOUT:?}"),
                ),
            ));
        }
    };

    tokio::fs::write(path, json_str)
        .await
        .map_err(|e| ScrapeError::persistence(path, e))?;

    log::debug!("Saved article JSON to {}", path.display());
    Ok(())
}

/// Load a record written by `save_record_json`.
pub async fn load_record_json(path: &Path) -> ScrapeResult<ArticleRecord> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ScrapeError::persistence(path, e))?;
    Ok(serde_json::from_str(&content)?)
}
