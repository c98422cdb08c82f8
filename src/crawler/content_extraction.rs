//! Content extraction functionality for the crawler module

use html2md::parse_html;
use scraper::{Html, Selector};

use crate::crawler::error::CrawlError;
use crate::crawler::PageMetadata;

/// One fetched page, parsed once and reduced to what the walker needs
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// Markdown of the main content region, `None` when the region is absent
    pub main_content: Option<String>,

    /// Metadata from the page head
    pub metadata: PageMetadata,

    /// Raw `href` values of every anchor in the page, in document order
    pub hrefs: Vec<String>,
}

/// Locates the main content region of a page and renders it to Markdown
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    content: Selector,
    anchors: Selector,
    title: Selector,
    description: Selector,
}

impl ContentExtractor {
    /// Create an extractor for the given main content selector
    pub fn new(content_selector: &str) -> Result<Self, CrawlError> {
        Ok(Self {
            content: parse_selector(content_selector)?,
            anchors: parse_selector("a[href]")?,
            title: parse_selector("title")?,
            description: parse_selector("meta[name='description']")?,
        })
    }

    /// Parse raw HTML into main content, metadata and outbound links
    pub fn parse(&self, html: &str) -> ParsedPage {
        let document = Html::parse_document(html);

        ParsedPage {
            main_content: self.main_content(&document),
            metadata: self.metadata(&document),
            hrefs: self.hrefs(&document),
        }
    }

    /// Extract the main content region as Markdown
    ///
    /// Only the first matching element is used. There is no fallback to the
    /// full page text: a page without the region yields `None`.
    pub fn extract(&self, html: &str) -> Option<String> {
        self.main_content(&Html::parse_document(html))
    }

    fn main_content(&self, document: &Html) -> Option<String> {
        document
            .select(&self.content)
            .next()
            .map(|element| html_to_markdown(&element.html()))
    }

    fn metadata(&self, document: &Html) -> PageMetadata {
        let title = document
            .select(&self.title)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|title| !title.is_empty());

        let description = document
            .select(&self.description)
            .next()
            .and_then(|element| element.value().attr("content"))
            .map(|s| s.trim().to_string())
            .filter(|description| !description.is_empty());

        PageMetadata { title, description }
    }

    fn hrefs(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.anchors)
            .filter_map(|element| element.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
            .collect()
    }
}

fn parse_selector(selector: &str) -> Result<Selector, CrawlError> {
    Selector::parse(selector).map_err(|e| {
        CrawlError::HtmlParse(format!("Failed to parse selector '{}': {}", selector, e))
    })
}

/// Convert HTML to Markdown, keeping links, images and tables, without wrapping
pub fn html_to_markdown(html: &str) -> String {
    parse_html(html)
}
