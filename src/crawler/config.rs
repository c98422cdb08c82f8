//! # Crawler Configuration Module
//!
//! Configuration for the documentation crawler: which element holds a page's
//! main content, which links are skipped, and the bounds that keep a run
//! finite. Built with a builder, like the rest of the crate's configuration.

use std::time::Duration;

/// Selector for the main content region of a documentation page
pub const DEFAULT_CONTENT_SELECTOR: &str = r#"div[role="main"]"#;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// CSS selector of the main content region; pages without it are skipped
    pub content_selector: String,

    /// Path extensions that are never followed
    pub skip_extensions: Vec<String>,

    /// Maximum number of fetch attempts in one run (`None` for no limit)
    pub max_pages: Option<usize>,

    /// Maximum link distance from the seed (`None` for no limit)
    pub max_depth: Option<u32>,

    /// User agent to use for requests
    pub user_agent: String,

    /// Timeout for a single page request in seconds
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            content_selector: DEFAULT_CONTENT_SELECTOR.to_string(),
            skip_extensions: vec![
                "pdf".to_string(),
                "jpg".to_string(),
                "png".to_string(),
                "zip".to_string(),
            ],
            max_pages: Some(500),
            max_depth: None,
            user_agent: format!("docscrawl/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the CSS selector of the main content region
    pub fn content_selector(mut self, content_selector: impl Into<String>) -> Self {
        self.config.content_selector = content_selector.into();
        self
    }

    /// Set the path extensions that are never followed
    pub fn skip_extensions(mut self, skip_extensions: Vec<String>) -> Self {
        self.config.skip_extensions = skip_extensions;
        self
    }

    /// Set the maximum number of fetch attempts
    pub fn max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the maximum link distance from the seed
    pub fn max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout in seconds
    pub fn request_timeout_secs(mut self, request_timeout_secs: u64) -> Self {
        self.config.request_timeout_secs = request_timeout_secs;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
