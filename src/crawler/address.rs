//! Normalized page addresses and the link filter

use std::fmt;

use url::Url;

use crate::crawler::error::CrawlError;

/// A normalized absolute http(s) URL identifying one fetchable page.
///
/// Two addresses are the same page when their string forms are equal. The
/// fragment is dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(Url);

impl Address {
    /// Parse an absolute address, such as a crawl seed
    pub fn parse(input: &str) -> Result<Self, CrawlError> {
        Self::from_url(Url::parse(input)?)
    }

    /// Resolve `href` against this address, the way a browser would
    pub fn join(&self, href: &str) -> Result<Self, CrawlError> {
        Self::from_url(self.0.join(href)?)
    }

    fn from_url(mut url: Url) -> Result<Self, CrawlError> {
        match url.scheme() {
            "http" | "https" => {}
            _ => return Err(CrawlError::UnsupportedAddress(url.to_string())),
        }
        if url.host_str().is_none() {
            return Err(CrawlError::UnsupportedAddress(url.to_string()));
        }
        url.set_fragment(None);
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// Host plus explicit port, e.g. `example.com` or `localhost:8080`
    pub fn authority(&self) -> String {
        let host = self.0.host_str().unwrap_or_default();
        match self.0.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Decides which discovered links the walker follows
#[derive(Debug, Clone)]
pub struct LinkFilter {
    authority: String,
    skip_extensions: Vec<String>,
}

impl LinkFilter {
    /// Follow links on the seed's host, skipping paths with the given extensions
    pub fn new(seed: &Address, skip_extensions: &[String]) -> Self {
        Self {
            authority: seed.authority(),
            skip_extensions: skip_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn allows(&self, address: &Address) -> bool {
        address.authority() == self.authority && !self.is_binary_asset(address.path())
    }

    fn is_binary_asset(&self, path: &str) -> bool {
        let last_segment = path.rsplit('/').next().unwrap_or_default();
        match last_segment.rsplit_once('.') {
            Some((_, ext)) => {
                let ext = ext.to_ascii_lowercase();
                self.skip_extensions.iter().any(|skip| *skip == ext)
            }
            None => false,
        }
    }
}
