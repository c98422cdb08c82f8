//! Error types for the docscrawl crate

use thiserror::Error;

/// Result type for docscrawl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for docscrawl operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Web crawling error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Document storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Summarization error
    #[error("Summarize error: {0}")]
    Summarize(String),
}
