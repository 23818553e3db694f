//! Type definitions for image fetching

use serde::{Deserialize, Serialize};

/// Bytes fetched for one image plus the extension to save them under
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// Dot-prefixed, e.g. `.jpg`
    pub extension: String,
}

/// Outcome counts for one batch of image fetches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSummary {
    pub total: usize,
    pub downloaded: usize,
    pub failed: usize,
    /// True when downloading was disabled and nothing was attempted
    pub skipped: bool,
}

impl FetchSummary {
    #[must_use]
    pub fn skipped(total: usize) -> Self {
        Self {
            total,
            skipped: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// `downloaded/total`, as shown to users
    #[must_use]
    pub fn ratio_label(&self) -> String {
        format!("{}/{}", self.downloaded, self.total)
    }
}
