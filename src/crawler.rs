//! # Documentation Crawler Module
//!
//! Walks a documentation site from a seed address, converts the main content
//! region of every page to Markdown, writes it to the output directory and
//! stores an LLM summary next to it.
//!
//! ## Key Components
//!
//! - `Crawler`: the frontier walker, generic over its `Fetcher` and `Summarizer`
//! - `Address` and `LinkFilter`: normalized addresses and the same-domain rule
//! - `VisitedSet`: addresses already fetched in a run
//! - `ContentExtractor`: main content selection and HTML to Markdown conversion
//! - `Storage`: slug-based document and summary files
//! - `CrawlReport`: what a run stored and skipped
//!
//! ## Behavior
//!
//! - Depth-first, in link order, one page at a time
//! - Each address is fetched at most once per run, even on cyclic link graphs
//! - Fetch, extraction and summarization failures only skip the page (or its
//!   summary); they never end the run
//! - Optional page and depth limits keep a run finite on sites with endless
//!   generated links

mod address;
mod config;
mod content_extraction;
mod error;
mod fetcher;
mod frontier;
mod report;
pub mod storage;
mod visited;

pub use address::{Address, LinkFilter};
pub use config::{CrawlerConfig, CrawlerConfigBuilder, DEFAULT_CONTENT_SELECTOR};
pub use content_extraction::{html_to_markdown, ContentExtractor, ParsedPage};
pub use error::CrawlError;
pub use fetcher::{Fetcher, HttpFetcher};
pub use frontier::{Crawler, VisitOutcome};
pub use report::{CrawlReport, SkipReason, SkippedPage, StoredPage};
pub use storage::{Storage, StorageConfig};
pub use visited::VisitedSet;

use serde::{Deserialize, Serialize};

/// Metadata for a crawled page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Title of the page
    pub title: Option<String>,

    /// Description of the page
    pub description: Option<String>,
}
