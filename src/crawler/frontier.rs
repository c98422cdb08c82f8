//! Depth-first walk over the same-domain pages reachable from a seed

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, error, info, instrument, warn};

use crate::crawler::address::{Address, LinkFilter};
use crate::crawler::content_extraction::ContentExtractor;
use crate::crawler::error::CrawlError;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::report::{CrawlReport, SkipReason, SkippedPage, StoredPage};
use crate::crawler::storage::Storage;
use crate::crawler::visited::VisitedSet;
use crate::crawler::CrawlerConfig;
use crate::summarizer::Summarizer;

/// Result of visiting a single address
#[derive(Debug)]
pub enum VisitOutcome {
    /// The address was already in the visited set; nothing was fetched
    AlreadyVisited,

    /// The address was fetched but produced no document
    Skipped(SkipReason),

    /// The page document was written
    Stored {
        page: StoredPage,
        /// Followable links of the page, in document order
        links: Vec<Address>,
    },
}

/// Crawls a site one page at a time, writing a document and a summary per page
///
/// Pages are visited depth-first in the order their links appear. Every
/// address is fetched at most once per run: it enters the visited set right
/// before its fetch, whether or not the fetch succeeds.
pub struct Crawler<F, S> {
    fetcher: F,
    summarizer: S,
    storage: Storage,
    extractor: ContentExtractor,
    config: CrawlerConfig,
    visited: VisitedSet,
}

impl<F, S> Crawler<F, S>
where
    F: Fetcher,
    S: Summarizer,
{
    /// Create a crawler with an empty visited set
    pub fn new(
        fetcher: F,
        summarizer: S,
        storage: Storage,
        config: CrawlerConfig,
    ) -> Result<Self, CrawlError> {
        let extractor = ContentExtractor::new(&config.content_selector)?;
        Ok(Self {
            fetcher,
            summarizer,
            storage,
            extractor,
            config,
            visited: VisitedSet::new(),
        })
    }

    /// Replace the visited set, e.g. to exclude addresses up front
    pub fn with_visited(mut self, visited: VisitedSet) -> Self {
        self.visited = visited;
        self
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn into_visited(self) -> VisitedSet {
        self.visited
    }

    /// Crawl every followable page reachable from `seed`
    ///
    /// Failures only affect the address they happened on and are recorded in
    /// the report. The run ends when the frontier is empty or a configured
    /// limit is reached.
    #[instrument(skip_all, fields(seed = %seed))]
    pub async fn crawl(&mut self, seed: &Address) -> CrawlReport {
        info!("Starting crawl for {}", seed);
        debug!("Crawler config: {:?}", self.config);

        let filter = LinkFilter::new(seed, &self.config.skip_extensions);
        let mut report = CrawlReport::new(seed.as_str());
        // LIFO so the first link of a page is explored before its siblings.
        let mut frontier: Vec<(Address, u32)> = vec![(seed.clone(), 0)];
        // Followable links of stored pages, keyed by URL, with the smallest
        // depth each page has been reached at. Only kept under a depth limit.
        let mut expansions: HashMap<String, Expansion> = HashMap::new();

        while let Some((address, depth)) = frontier.pop() {
            if self.visited.contains(&address) {
                if let Some(expansion) = expansions.get_mut(address.as_str()) {
                    if depth < expansion.depth {
                        debug!("Reached {} again at shallower depth {}", address, depth);
                        expansion.depth = depth;
                        let links = expansion.links.clone();
                        self.push_links(&mut frontier, &expansions, &address, links, depth);
                    }
                }
                continue;
            }
            if self
                .config
                .max_pages
                .is_some_and(|max_pages| report.fetch_attempts >= max_pages)
            {
                warn!(
                    "Page limit of {} reached, stopping with work remaining",
                    report.fetch_attempts
                );
                report.truncated = true;
                break;
            }

            let outcome = self.visit(&address, &filter).await;
            if !matches!(outcome, VisitOutcome::AlreadyVisited) {
                report.fetch_attempts += 1;
            }

            match outcome {
                VisitOutcome::AlreadyVisited => {}
                VisitOutcome::Skipped(reason) => report.skipped.push(SkippedPage {
                    url: address.to_string(),
                    reason,
                }),
                VisitOutcome::Stored { page, links } => {
                    report.pages.push(page);

                    if self.config.max_depth.is_some() {
                        expansions.insert(
                            address.as_str().to_string(),
                            Expansion {
                                depth,
                                links: links.clone(),
                            },
                        );
                    }
                    self.push_links(&mut frontier, &expansions, &address, links, depth);
                }
            }
        }

        report.finish();
        info!(
            "Crawl finished: {} pages stored, {} skipped, {} summaries",
            report.pages.len(),
            report.skipped.len(),
            report.summary_count()
        );
        report
    }

    /// Queue the links of `page`, reached at `depth`, unless the depth limit stops them
    ///
    /// A link is queued when it is unvisited, or when it was stored at a
    /// greater depth than it would now have and its own links may need
    /// following again.
    fn push_links(
        &self,
        frontier: &mut Vec<(Address, u32)>,
        expansions: &HashMap<String, Expansion>,
        page: &Address,
        links: Vec<Address>,
        depth: u32,
    ) {
        if self
            .config
            .max_depth
            .is_some_and(|max_depth| depth >= max_depth)
        {
            debug!("Not following links of {} at depth {}", page, depth);
            return;
        }

        let link_depth = depth + 1;
        for link in links.into_iter().rev() {
            let shallower = expansions
                .get(link.as_str())
                .is_some_and(|expansion| expansion.depth > link_depth);
            if !self.visited.contains(&link) || shallower {
                frontier.push((link, link_depth));
            }
        }
    }

    /// Fetch, extract, store and summarize one page
    ///
    /// The address is marked visited before it is fetched. Links are only
    /// returned for pages whose main content was found and stored.
    #[instrument(skip_all, fields(url = %address))]
    pub async fn visit(&mut self, address: &Address, filter: &LinkFilter) -> VisitOutcome {
        if !self.visited.insert(address) {
            debug!("Already visited {}", address);
            return VisitOutcome::AlreadyVisited;
        }

        let html = match self.fetcher.fetch(address).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Failed to fetch {}: {}", address, e);
                return VisitOutcome::Skipped(SkipReason::Fetch(e.to_string()));
            }
        };

        let parsed = self.extractor.parse(&html);
        let Some(markdown) = parsed.main_content else {
            info!("Main content not found in {}", address);
            return VisitOutcome::Skipped(SkipReason::MissingContent);
        };

        let document_path = match self.storage.store_document(address, &markdown).await {
            Ok(path) => path,
            Err(e) => {
                error!("Failed to store document for {}: {}", address, e);
                return VisitOutcome::Skipped(SkipReason::Storage(e.to_string()));
            }
        };
        debug!("Stored {}", document_path.display());

        let summary_path = self.summarize(address, &markdown).await;
        let links = followable_links(address, &parsed.hrefs, filter);

        VisitOutcome::Stored {
            page: StoredPage {
                url: address.to_string(),
                metadata: parsed.metadata,
                document_path,
                summary_path,
            },
            links,
        }
    }

    async fn summarize(&self, address: &Address, markdown: &str) -> Option<PathBuf> {
        let summary = match self.summarizer.summarize(markdown).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Failed to summarize {}: {}", address, e);
                return None;
            }
        };
        if summary.is_empty() {
            debug!("No summary produced for {}", address);
            return None;
        }

        match self.storage.store_summary(address, &summary).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Failed to store summary for {}: {}", address, e);
                None
            }
        }
    }
}

/// Links of a stored page and the smallest depth it has been reached at
struct Expansion {
    depth: u32,
    links: Vec<Address>,
}

/// Resolve raw hrefs against `page` and keep the ones the filter allows
fn followable_links(page: &Address, hrefs: &[String], filter: &LinkFilter) -> Vec<Address> {
    hrefs
        .iter()
        .filter_map(|href| page.join(href).ok())
        .filter(|link| filter.allows(link))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::crawler::storage::StorageConfig;
    use crate::summarizer::SummarizeError;

    const BASE: &str = "https://example.com";

    /// Serves pages from memory and records every fetch
    #[derive(Clone, Default)]
    struct MockFetcher {
        pages: HashMap<String, String>,
        fetched: Arc<Mutex<Vec<String>>>,
    }

    impl MockFetcher {
        fn with_page(mut self, path: &str, html: String) -> Self {
            self.pages.insert(format!("{}{}", BASE, path), html);
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }

        fn fetched_paths(&self) -> Vec<String> {
            self.fetched()
                .into_iter()
                .map(|url| url.trim_start_matches(BASE).to_string())
                .collect()
        }
    }

    impl Fetcher for MockFetcher {
        async fn fetch(&self, address: &Address) -> Result<String, CrawlError> {
            self.fetched.lock().unwrap().push(address.to_string());
            self.pages
                .get(address.as_str())
                .cloned()
                .ok_or_else(|| CrawlError::Other(format!("404 Not Found: {}", address)))
        }
    }

    /// Replies with a fixed summary, or fails every call
    #[derive(Clone)]
    struct MockSummarizer {
        reply: Option<String>,
        calls: Arc<Mutex<usize>>,
    }

    impl MockSummarizer {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                calls: Arc::new(Mutex::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: Arc::new(Mutex::new(0)),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl Summarizer for MockSummarizer {
        async fn summarize(&self, _document: &str) -> Result<String, SummarizeError> {
            *self.calls.lock().unwrap() += 1;
            self.reply
                .clone()
                .ok_or_else(|| SummarizeError::Completion("service unavailable".to_string()))
        }
    }

    fn page(title: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<li><a href="{}">{}</a></li>"#, href, href))
            .collect();
        format!(
            r#"<html><head><title>{title}</title></head><body>
<div role="main"><h1>{title}</h1><ul>{anchors}</ul></div>
</body></html>"#
        )
    }

    fn page_without_main(links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
            .collect();
        format!("<html><body><div class=\"content\">{}</div></body></html>", anchors)
    }

    fn seed() -> Address {
        Address::parse(&format!("{}/", BASE)).unwrap()
    }

    fn crawler<S: Summarizer>(
        fetcher: &MockFetcher,
        summarizer: S,
        dir: &tempfile::TempDir,
        config: CrawlerConfig,
    ) -> Crawler<MockFetcher, S> {
        let storage = Storage::with_config(StorageConfig {
            output_dir: dir.path().to_path_buf(),
        });
        Crawler::new(fetcher.clone(), summarizer, storage, config).unwrap()
    }

    #[tokio::test]
    async fn test_cycle_is_fetched_once() {
        let fetcher = MockFetcher::default()
            .with_page("/", page("A", &["/b"]))
            .with_page("/b", page("B", &["/", "/b", "#top"]));
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(
            &fetcher,
            MockSummarizer::replying("summary"),
            &dir,
            CrawlerConfig::default(),
        );

        let report = crawler.crawl(&seed()).await;

        assert_eq!(fetcher.fetched_paths(), vec!["/", "/b"]);
        assert_eq!(report.fetch_attempts, 2);
        assert_eq!(report.pages.len(), 2);
        assert!(!report.truncated);
    }

    #[tokio::test]
    async fn test_link_filter_during_crawl() {
        let fetcher = MockFetcher::default()
            .with_page(
                "/",
                page(
                    "Index",
                    &["/docs/page.html", "http://other.example/x", "/files/report.pdf"],
                ),
            )
            .with_page("/docs/page.html", page("Page", &[]));
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(
            &fetcher,
            MockSummarizer::replying("summary"),
            &dir,
            CrawlerConfig::default(),
        );

        crawler.crawl(&seed()).await;

        assert_eq!(fetcher.fetched_paths(), vec!["/", "/docs/page.html"]);
    }

    #[tokio::test]
    async fn test_documents_and_summaries_are_written() {
        let fetcher = MockFetcher::default()
            .with_page("/", page("Index", &["/a/b"]))
            .with_page("/a/b", page("Nested", &[]));
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(
            &fetcher,
            MockSummarizer::replying("Short summary."),
            &dir,
            CrawlerConfig::default(),
        );

        let report = crawler.crawl(&seed()).await;

        let index = std::fs::read_to_string(dir.path().join("index.md")).unwrap();
        assert!(index.contains("Index"));
        let nested = std::fs::read_to_string(dir.path().join("a_b.md")).unwrap();
        assert!(nested.contains("Nested"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a_b.summary.md")).unwrap(),
            "Short summary."
        );
        assert_eq!(report.summary_count(), 2);
        assert_eq!(report.pages[1].metadata.title.as_deref(), Some("Nested"));
        assert_eq!(report.pages[1].document_path, dir.path().join("a_b.md"));
    }

    #[tokio::test]
    async fn test_missing_main_content_is_skipped_but_visited() {
        let fetcher = MockFetcher::default()
            .with_page("/", page("Index", &["/bare", "/next", "/bare"]))
            .with_page("/bare", page_without_main(&["/hidden"]))
            .with_page("/next", page("Next", &["/bare"]))
            .with_page("/hidden", page("Hidden", &[]));
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(
            &fetcher,
            MockSummarizer::replying("summary"),
            &dir,
            CrawlerConfig::default(),
        );

        let report = crawler.crawl(&seed()).await;

        assert_eq!(fetcher.fetched_paths(), vec!["/", "/bare", "/next"]);
        assert!(report.pages.iter().all(|page| !page.url.ends_with("/bare")));
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::MissingContent);
        assert!(!dir.path().join("bare.md").exists());

        let bare = Address::parse(&format!("{}/bare", BASE)).unwrap();
        assert!(crawler.visited().contains(&bare));
    }

    #[tokio::test]
    async fn test_summarization_failure_is_soft() {
        let fetcher = MockFetcher::default()
            .with_page("/", page("Index", &["/child"]))
            .with_page("/child", page("Child", &[]));
        let summarizer = MockSummarizer::failing();
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(&fetcher, summarizer.clone(), &dir, CrawlerConfig::default());

        let report = crawler.crawl(&seed()).await;

        assert_eq!(fetcher.fetched_paths(), vec!["/", "/child"]);
        assert_eq!(summarizer.calls(), 2);
        assert_eq!(report.pages.len(), 2);
        assert_eq!(report.summary_count(), 0);
        assert!(dir.path().join("index.md").exists());
        assert!(dir.path().join("child.md").exists());
        assert!(!dir.path().join("index.summary.md").exists());
    }

    #[tokio::test]
    async fn test_empty_summary_writes_no_file() {
        let fetcher = MockFetcher::default().with_page("/", page("Index", &[]));
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(
            &fetcher,
            MockSummarizer::replying(""),
            &dir,
            CrawlerConfig::default(),
        );

        let report = crawler.crawl(&seed()).await;

        assert!(dir.path().join("index.md").exists());
        assert!(!dir.path().join("index.summary.md").exists());
        assert_eq!(report.pages[0].summary_path, None);
    }

    #[tokio::test]
    async fn test_acyclic_graph_fetches_each_page_once() {
        let fetcher = MockFetcher::default()
            .with_page("/", page("A", &["/b", "/c"]))
            .with_page("/b", page("B", &["/d"]))
            .with_page("/c", page("C", &["/d"]))
            .with_page("/d", page("D", &["/e"]))
            .with_page("/e", page("E", &[]));
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(
            &fetcher,
            MockSummarizer::replying("summary"),
            &dir,
            CrawlerConfig::default(),
        );

        let report = crawler.crawl(&seed()).await;

        assert_eq!(report.fetch_attempts, 5);
        assert_eq!(fetcher.fetched().len(), 5);
        assert_eq!(report.pages.len(), 5);
        assert_eq!(crawler.visited().len(), 5);
    }

    #[tokio::test]
    async fn test_depth_first_document_order() {
        let fetcher = MockFetcher::default()
            .with_page("/", page("A", &["/b", "/c"]))
            .with_page("/b", page("B", &["/d", "/c"]))
            .with_page("/c", page("C", &[]))
            .with_page("/d", page("D", &[]));
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(
            &fetcher,
            MockSummarizer::replying("summary"),
            &dir,
            CrawlerConfig::default(),
        );

        crawler.crawl(&seed()).await;

        assert_eq!(fetcher.fetched_paths(), vec!["/", "/b", "/d", "/c"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_continues_with_siblings() {
        let fetcher = MockFetcher::default()
            .with_page("/", page("A", &["/gone", "/c"]))
            .with_page("/c", page("C", &[]));
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(
            &fetcher,
            MockSummarizer::replying("summary"),
            &dir,
            CrawlerConfig::default(),
        );

        let report = crawler.crawl(&seed()).await;

        assert_eq!(fetcher.fetched_paths(), vec!["/", "/gone", "/c"]);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(report.skipped[0].reason, SkipReason::Fetch(_)));
        assert_eq!(report.pages.len(), 2);
    }

    #[tokio::test]
    async fn test_page_limit_truncates() {
        let fetcher = MockFetcher::default()
            .with_page("/", page("A", &["/b", "/c"]))
            .with_page("/b", page("B", &[]))
            .with_page("/c", page("C", &[]));
        let dir = tempfile::tempdir().unwrap();
        let config = CrawlerConfig::builder().max_pages(Some(2)).build();
        let mut crawler = crawler(&fetcher, MockSummarizer::replying("summary"), &dir, config);

        let report = crawler.crawl(&seed()).await;

        assert_eq!(fetcher.fetched_paths(), vec!["/", "/b"]);
        assert!(report.truncated);
    }

    #[tokio::test]
    async fn test_page_limit_not_reached() {
        let fetcher = MockFetcher::default()
            .with_page("/", page("A", &["/b"]))
            .with_page("/b", page("B", &[]));
        let dir = tempfile::tempdir().unwrap();
        let config = CrawlerConfig::builder().max_pages(Some(2)).build();
        let mut crawler = crawler(&fetcher, MockSummarizer::replying("summary"), &dir, config);

        let report = crawler.crawl(&seed()).await;

        assert_eq!(report.fetch_attempts, 2);
        assert!(!report.truncated);
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let fetcher = MockFetcher::default()
            .with_page("/", page("A", &["/b"]))
            .with_page("/b", page("B", &["/c"]))
            .with_page("/c", page("C", &[]));
        let dir = tempfile::tempdir().unwrap();
        let config = CrawlerConfig::builder().max_depth(Some(1)).build();
        let mut crawler = crawler(&fetcher, MockSummarizer::replying("summary"), &dir, config);

        crawler.crawl(&seed()).await;

        assert_eq!(fetcher.fetched_paths(), vec!["/", "/b"]);
    }

    #[tokio::test]
    async fn test_depth_limit_uses_shortest_path() {
        // "/c" is first reached through "/b" at depth 2, then from the seed at depth 1.
        let fetcher = MockFetcher::default()
            .with_page("/", page("A", &["/b", "/c"]))
            .with_page("/b", page("B", &["/c"]))
            .with_page("/c", page("C", &["/d"]))
            .with_page("/d", page("D", &["/e"]))
            .with_page("/e", page("E", &[]));
        let dir = tempfile::tempdir().unwrap();
        let config = CrawlerConfig::builder().max_depth(Some(2)).build();
        let mut crawler = crawler(&fetcher, MockSummarizer::replying("summary"), &dir, config);

        let report = crawler.crawl(&seed()).await;

        assert_eq!(fetcher.fetched_paths(), vec!["/", "/b", "/c", "/d"]);
        assert_eq!(report.fetch_attempts, 4);
        assert_eq!(report.pages.len(), 4);
        assert!(!report.truncated);
    }

    #[tokio::test]
    async fn test_shallower_path_reaches_past_stored_pages() {
        // "/c" and "/d" are stored at depths 3 and 4 before the seed's direct
        // link lowers them to 1 and 2.
        let fetcher = MockFetcher::default()
            .with_page("/", page("A", &["/b", "/c"]))
            .with_page("/b", page("B", &["/x"]))
            .with_page("/x", page("X", &["/c"]))
            .with_page("/c", page("C", &["/d"]))
            .with_page("/d", page("D", &["/e"]))
            .with_page("/e", page("E", &["/f"]))
            .with_page("/f", page("F", &["/g"]))
            .with_page("/g", page("G", &[]));
        let dir = tempfile::tempdir().unwrap();
        let config = CrawlerConfig::builder().max_depth(Some(4)).build();
        let mut crawler = crawler(&fetcher, MockSummarizer::replying("summary"), &dir, config);

        let report = crawler.crawl(&seed()).await;

        assert_eq!(
            fetcher.fetched_paths(),
            vec!["/", "/b", "/x", "/c", "/d", "/e", "/f"]
        );
        assert_eq!(report.fetch_attempts, 7);
    }

    #[tokio::test]
    async fn test_injected_visited_set() {
        let fetcher = MockFetcher::default()
            .with_page("/", page("A", &["/b", "/c"]))
            .with_page("/b", page("B", &[]))
            .with_page("/c", page("C", &[]));
        let mut visited = VisitedSet::new();
        visited.insert(&Address::parse(&format!("{}/b", BASE)).unwrap());
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(
            &fetcher,
            MockSummarizer::replying("summary"),
            &dir,
            CrawlerConfig::default(),
        )
        .with_visited(visited);

        crawler.crawl(&seed()).await;

        assert_eq!(fetcher.fetched_paths(), vec!["/", "/c"]);
        assert_eq!(crawler.into_visited().len(), 3);
    }

    #[tokio::test]
    async fn test_visit_twice() {
        let fetcher = MockFetcher::default().with_page("/", page("A", &["/b"]));
        let dir = tempfile::tempdir().unwrap();
        let mut crawler = crawler(
            &fetcher,
            MockSummarizer::replying("summary"),
            &dir,
            CrawlerConfig::default(),
        );
        let seed = seed();
        let filter = LinkFilter::new(&seed, &CrawlerConfig::default().skip_extensions);

        match crawler.visit(&seed, &filter).await {
            VisitOutcome::Stored { links, .. } => {
                assert_eq!(links.len(), 1);
                assert_eq!(links[0].as_str(), "https://example.com/b");
            }
            other => panic!("Expected Stored, got {:?}", other),
        }
        assert!(matches!(
            crawler.visit(&seed, &filter).await,
            VisitOutcome::AlreadyVisited
        ));
        assert_eq!(fetcher.fetched().len(), 1);
    }
}
