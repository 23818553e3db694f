//! Core error and bookkeeping types for article retrieval.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the scrape pipeline
///
/// Extraction never fails and per-image failures stay on the `ImageRef`, so
/// only engine acquisition, retrieval and persistence appear here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Every browser launch tier failed
    #[error("Browser engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Navigation, readiness or scrolling kept failing across all attempts
    #[error("Failed to retrieve {url} after {attempts} attempt(s): {cause}")]
    RetrievalFailed {
        url: String,
        attempts: u32,
        cause: String,
    },

    /// Filesystem failure while saving an article
    #[error("Failed to persist {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The body markup could not be rewritten
    #[error("Failed to rewrite article HTML: {0}")]
    Rewrite(String),

    /// Record serialization failed
    #[error("Failed to serialize article record: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScrapeError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable tag for reporting
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EngineUnavailable(_) => "engine_unavailable",
            Self::RetrievalFailed { .. } => "retrieval_failed",
            Self::Persistence { .. } | Self::Rewrite(_) | Self::Serialization(_) => {
                "persistence_error"
            }
        }
    }
}

/// Convenience alias for Result with `ScrapeError`
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Bookkeeping for the bounded retry loop. Never persisted.
#[derive(Debug, Clone)]
pub struct RetrievalAttempt {
    /// 1-based index of the attempt currently running
    pub index: u32,
    pub max_attempts: u32,
    /// Rendered with `{:#}` so the context chain survives
    pub last_failure: Option<String>,
}

impl RetrievalAttempt {
    #[must_use]
    pub fn new(max_attempts: u32) -> Self {
        Self {
            index: 0,
            max_attempts: max_attempts.max(1),
            last_failure: None,
        }
    }

    /// Advance to the next attempt. Returns false once the budget is spent.
    pub fn begin_next(&mut self) -> bool {
        if self.index >= self.max_attempts {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn record_failure(&mut self, error: &anyhow::Error) {
        self.last_failure = Some(format!("{error:#}"));
    }

    #[must_use]
    pub fn has_remaining(&self) -> bool {
        self.index < self.max_attempts
    }

    /// Build the error surfaced to callers.
    #[must_use]
    pub fn to_error(&self, url: &str) -> ScrapeError {
        ScrapeError::RetrievalFailed {
            url: url.to_string(),
            attempts: self.index,
            cause: self
                .last_failure
                .clone()
                .unwrap_or_else(|| "no attempt was made".to_string()),
        }
    }
}
