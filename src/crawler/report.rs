//! Record of one crawl run

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crawler::PageMetadata;

/// A page whose document was written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPage {
    /// Address of the page
    pub url: String,

    /// Metadata extracted from the page
    pub metadata: PageMetadata,

    /// Where the Markdown document was written
    pub document_path: PathBuf,

    /// Where the summary was written, if one was produced
    pub summary_path: Option<PathBuf>,
}

/// Why a visited address produced no document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SkipReason {
    /// Network failure, error status or non-HTML response
    Fetch(String),
    /// The main content region was absent
    MissingContent,
    /// The page document could not be written
    Storage(String),
}

/// A visited address that produced no document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedPage {
    pub url: String,
    pub reason: SkipReason,
}

/// Summary of one crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Address the crawl started from
    pub seed: String,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,

    /// Number of addresses fetched (or attempted)
    pub fetch_attempts: usize,

    /// Pages whose documents were written, in visit order
    pub pages: Vec<StoredPage>,

    /// Visited addresses that produced no document, in visit order
    pub skipped: Vec<SkippedPage>,

    /// Whether the run stopped on the page limit with work remaining
    pub truncated: bool,
}

impl CrawlReport {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            started_at: Utc::now(),
            finished_at: None,
            fetch_attempts: 0,
            pages: Vec::new(),
            skipped: Vec::new(),
            truncated: false,
        }
    }

    /// Number of summary documents written
    pub fn summary_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|page| page.summary_path.is_some())
            .count()
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}
