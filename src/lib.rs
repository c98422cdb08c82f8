//! # docscrawl - Documentation Crawler with LLM Summaries
//!
//! This crate crawls a documentation site into a directory of Markdown files,
//! one per page, and asks a language model for a short summary of each page.
//!
//! ## Features
//!
//! - Depth-first crawl of same-domain pages with revisit suppression
//! - Main content extraction and HTML to Markdown conversion
//! - Per-page summaries through any `rig` completion model
//! - Rate-limited Gemini model construction
//! - Page and depth limits, and a serializable report of every run
//!
//! ## Example
//!
//! ```rust,no_run
//! use docscrawl::crawler::{Address, Crawler, CrawlerConfig, HttpFetcher, Storage};
//! use docscrawl::summarizer::{CompletionSummarizer, SummarizerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CrawlerConfig::default();
//!     let summarizer_config = SummarizerConfig::default();
//!     let model = docscrawl::model::gemini_model_from_env(
//!         &summarizer_config.model,
//!         summarizer_config.requests_per_minute,
//!     )?;
//!
//!     let mut crawler = Crawler::new(
//!         HttpFetcher::new(&config)?,
//!         CompletionSummarizer::new(model, &summarizer_config),
//!         Storage::new(),
//!         config,
//!     )?;
//!
//!     let seed = Address::parse("https://requests.readthedocs.io/en/latest/")?;
//!     let report = crawler.crawl(&seed).await;
//!     println!("Stored {} pages", report.pages.len());
//!     Ok(())
//! }
//! ```

mod error;
pub mod crawler;
pub mod model;
pub mod summarizer;

pub use error::{Error, Result};
