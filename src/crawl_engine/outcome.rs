//! Reportable scrape outcome, serialized as tagged JSON by the CLI.

use serde::{Deserialize, Serialize};

use super::crawl_types::{ScrapeError, ScrapeResult};
use super::orchestrator::ScrapeOutcome;
use crate::content_saver::SaveResult;

/// Article metadata surfaced to callers after a successful scrape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub title: String,
    pub author: String,
    pub publish_time: String,
    pub word_count: usize,
    pub image_count: usize,
    /// `downloaded/total`
    pub images_downloaded: String,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScrapeReport {
    Success {
        message: String,
        article: ArticleSummary,
        files: SaveResult,
    },
    Error {
        message: String,
        kind: String,
    },
}

impl ScrapeReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<&ScrapeOutcome> for ScrapeReport {
    fn from(outcome: &ScrapeOutcome) -> Self {
        let record = &outcome.record;
        let images = outcome.saved.images;

        let message = if images.has_failures() {
            format!(
                "Article saved; {} of {} images failed to download",
                images.failed, images.total
            )
        } else {
            "Article saved".to_string()
        };

        Self::Success {
            message,
            article: ArticleSummary {
                title: record.title.clone(),
                author: record.author.clone(),
                publish_time: record.publish_time.clone(),
                word_count: record.word_count,
                image_count: record.image_count,
                images_downloaded: format!("{}/{}", record.downloaded_images(), record.images.len()),
                source_url: record.source_url.clone(),
            },
            files: outcome.saved.clone(),
        }
    }
}

impl From<&ScrapeError> for ScrapeReport {
    fn from(error: &ScrapeError) -> Self {
        Self::Error {
            message: error.to_string(),
            kind: error.kind().to_string(),
        }
    }
}

impl From<&ScrapeResult<ScrapeOutcome>> for ScrapeReport {
    fn from(result: &ScrapeResult<ScrapeOutcome>) -> Self {
        match result {
            Ok(outcome) => Self::from(outcome),
            Err(e) => Self::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_report_is_tagged() {
        let err = ScrapeError::EngineUnavailable("no chrome".to_string());
        let json = serde_json::to_value(ScrapeReport::from(&err)).unwrap();

        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "engine_unavailable");
        assert!(json["message"].as_str().unwrap().contains("no chrome"));
    }

    #[test]
    fn retrieval_failure_mentions_url_and_attempts() {
        let err = ScrapeError::RetrievalFailed {
            url: "https://mp.weixin.qq.com/s/x".to_string(),
            attempts: 3,
            cause: "navigation failed".to_string(),
        };
        let report = ScrapeReport::from(&Err::<ScrapeOutcome, _>(err));

        assert!(!report.is_success());
        let ScrapeReport::Error { message, .. } = report else {
            panic!("expected error report");
        };
        assert!(message.contains("after 3 attempt(s)"));
    }
}
