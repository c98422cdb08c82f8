//! Page fetching for the crawler

use std::future::Future;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::crawler::address::Address;
use crate::crawler::error::CrawlError;
use crate::crawler::CrawlerConfig;

/// Fetches the raw HTML of a page
///
/// The walker only depends on this capability, so tests can serve pages from
/// memory instead of the network.
pub trait Fetcher {
    fn fetch(&self, address: &Address) -> impl Future<Output = Result<String, CrawlError>> + Send;
}

/// Fetcher backed by a reqwest HTTP client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher using the user agent and timeout from the config
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %address))]
    async fn fetch(&self, address: &Address) -> Result<String, CrawlError> {
        let response = self
            .client
            .get(address.url().clone())
            .send()
            .await?
            .error_for_status()?;

        // A missing content type is treated as HTML.
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(CrawlError::NotHtml {
                url: address.to_string(),
                content_type,
            });
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes", body.len());
        Ok(body)
    }
}
