//! Error types for the crawler module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response was not an HTML page
    #[error("Unsupported content type '{content_type}' for {url}")]
    NotHtml {
        /// Address that was fetched
        url: String,
        /// Content type reported by the server
        content_type: String,
    },

    /// HTML parsing error
    #[error("HTML parsing error: {0}")]
    HtmlParse(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Address is not a crawlable http(s) URL
    #[error("Unsupported address: {0}")]
    UnsupportedAddress(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Http(e) => CrateError::Http(e),
            _ => CrateError::Crawl(err.to_string()),
        }
    }
}
