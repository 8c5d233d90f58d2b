// src/crawl/engine.rs
// =============================================================================
// The public entry point of the crawler: crawl().
//
// What happens here:
// 1. Validate the configuration (start URL, worker count)
// 2. Seed the visited set, the output list and the dispatcher with the
//    start URL at depth 0
// 3. Start `workers` worker tasks and the optional stats reporter
// 4. Wait until every worker has exited (the dispatcher closes the queue
//    when the last outstanding job completes)
// 5. Hand back the list of pages in the order they were admitted
//
// Errors on individual pages never reach the caller. The only error this
// returns is InvalidInput, and that happens before any request is made.
// =============================================================================

use futures::future::join_all;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use super::dispatcher::{CrawlJob, Dispatcher};
use super::resolve::same_host;
use super::stats::{CrawlStats, StatsReporter, StatsSnapshot};
use super::visited::VisitedSet;
use super::worker::run_worker;
use crate::error::CrawlError;
use crate::fetch::PageSource;

/// Settings for one crawl. Not changed once the crawl starts.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_url: String,
    /// Pages up to this many hops from the start are listed; pages fewer
    /// hops away are also fetched and expanded. 0 lists only the start URL.
    pub max_depth: usize,
    pub workers: usize,
    /// Log a stats snapshot this often; None turns the reporter off
    pub stats_interval: Option<Duration>,
}

impl CrawlConfig {
    pub fn new(start_url: impl Into<String>, max_depth: usize, workers: usize) -> Self {
        Self {
            start_url: start_url.into(),
            max_depth,
            workers,
            stats_interval: None,
        }
    }

    pub fn with_stats(mut self, every: Duration) -> Self {
        self.stats_interval = Some(every);
        self
    }

    // Parses the start URL into its canonical form
    fn start(&self) -> Result<Url, CrawlError> {
        let mut start = Url::parse(&self.start_url).map_err(|e| {
            CrawlError::InvalidInput(format!("invalid URL '{}': {}", self.start_url, e))
        })?;

        if !matches!(start.scheme(), "http" | "https") || start.host_str().is_none() {
            return Err(CrawlError::InvalidInput(format!(
                "start URL must be an http(s) URL with a host: {}",
                self.start_url
            )));
        }
        if self.workers == 0 {
            return Err(CrawlError::InvalidInput(
                "at least one worker is required".to_string(),
            ));
        }

        start.set_fragment(None);
        Ok(start)
    }
}

/// What a finished crawl hands back.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    pub start_url: String,
    /// Every admitted URL, start URL first, then in admission order
    pub pages: Vec<String>,
    pub stats: StatsSnapshot,
}

// State shared by all workers of one crawl
pub(super) struct CrawlContext {
    pub start: Url,
    pub max_depth: usize,
    pub source: Arc<dyn PageSource>,
    pub visited: VisitedSet,
    pub dispatcher: Dispatcher,
    pub stats: Arc<CrawlStats>,
    output: Mutex<Vec<String>>,
}

impl CrawlContext {
    // Appends to the output list
    pub fn record(&self, url: String) {
        self.output
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url);
    }

    fn take_output(&self) -> Vec<String> {
        std::mem::take(&mut *self.output.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

/// Crawls every page reachable from `config.start_url` on the same host.
pub async fn crawl(
    config: &CrawlConfig,
    source: Arc<dyn PageSource>,
) -> Result<CrawlResult, CrawlError> {
    let start = config.start()?;
    let start_url = start.to_string();

    tracing::info!(
        "Starting sitemap build for {} (depth: {}, workers: {})",
        start_url,
        config.max_depth,
        config.workers
    );

    let stats = Arc::new(CrawlStats::new());
    let visited = VisitedSet::new();
    visited.admit(&start_url);
    stats.job_submitted();

    let ctx = Arc::new(CrawlContext {
        start,
        max_depth: config.max_depth,
        source,
        visited,
        dispatcher: Dispatcher::new(CrawlJob {
            url: start_url.clone(),
            depth: 0,
        }),
        stats: Arc::clone(&stats),
        output: Mutex::new(vec![start_url.clone()]),
    });

    let reporter = config
        .stats_interval
        .map(|every| StatsReporter::spawn(Arc::clone(&stats), every));

    let handles = (0..config.workers).map(|id| tokio::spawn(run_worker(id, Arc::clone(&ctx))));
    for result in join_all(handles).await {
        if let Err(e) = result {
            tracing::error!("worker task failed: {}", e);
        }
    }

    // The stats task only goes away once the pool has fully drained
    if let Some(reporter) = reporter {
        reporter.stop().await;
    }

    debug_assert!(ctx.dispatcher.is_closed());
    debug_assert_eq!(ctx.dispatcher.outstanding(), 0);
    let pages = ctx.take_output();
    debug_assert!(pages.iter().all(|p| same_host(&start_url, p)));
    tracing::info!(
        "All workers finished. Found {} unique pages ({} visited).",
        pages.len(),
        ctx.visited.len()
    );

    Ok(CrawlResult {
        start_url,
        pages,
        stats: stats.snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum FakePage {
        Html(String),
        Status(u16),
        NotHtml(&'static str),
    }

    // An in-memory website: URL -> HTML body, HTTP status error or a
    // non-HTML resource
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, FakePage>,
        fetches: AtomicUsize,
    }

    impl FakeSite {
        fn page(mut self, url: &str, links: &[&str]) -> Self {
            let body: String = links
                .iter()
                .map(|href| format!("<a href=\"{}\">link</a>", href))
                .collect();
            self.pages.insert(
                url.to_string(),
                FakePage::Html(format!("<html><body>{}</body></html>", body)),
            );
            self
        }

        fn failing(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), FakePage::Status(status));
            self
        }

        fn not_html(mut self, url: &str, content_type: &'static str) -> Self {
            self.pages.insert(url.to_string(), FakePage::NotHtml(content_type));
            self
        }
    }

    #[async_trait]
    impl PageSource for FakeSite {
        async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            // Give other workers a chance to run in between
            tokio::task::yield_now().await;
            match self.pages.get(url) {
                Some(FakePage::Html(body)) => Ok(body.clone()),
                Some(FakePage::Status(status)) => Err(FetchError::Status(*status)),
                Some(FakePage::NotHtml(ct)) => Err(FetchError::UnsupportedContent(ct.to_string())),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    async fn run(site: FakeSite, start: &str, max_depth: usize, workers: usize) -> Vec<String> {
        let config = CrawlConfig::new(start, max_depth, workers);
        crawl(&config, Arc::new(site)).await.unwrap().pages
    }

    fn set(urls: &[&str]) -> HashSet<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    fn as_set(pages: &[String]) -> HashSet<String> {
        pages.iter().cloned().collect()
    }

    #[tokio::test]
    async fn test_depth_zero_is_only_start() {
        let site = Arc::new(FakeSite::default().page("https://a.test/", &["/b"]));
        let config = CrawlConfig::new("https://a.test/", 0, 4);
        let result = crawl(&config, Arc::clone(&site) as Arc<dyn PageSource>)
            .await
            .unwrap();

        assert_eq!(result.pages, vec!["https://a.test/"]);
        // The start page is still downloaded, its links just aren't listed
        assert_eq!(site.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(result.stats.scanned, 1);
        assert_eq!(result.stats.added, 0);
    }

    #[tokio::test]
    async fn test_linear_chain_stops_at_depth() {
        let site = FakeSite::default()
            .page("https://a.test/", &["/b"])
            .page("https://a.test/b", &["/c"])
            .page("https://a.test/c", &["/d"])
            .page("https://a.test/d", &[]);

        let pages = run(site, "https://a.test/", 2, 3).await;
        assert_eq!(pages, vec!["https://a.test/", "https://a.test/b", "https://a.test/c"]);
    }

    #[tokio::test]
    async fn test_cycle_terminates() {
        for max_depth in [1, 2, 5] {
            let site = FakeSite::default()
                .page("https://a.test/", &["/b"])
                .page("https://a.test/b", &["/"]);
            let pages = run(site, "https://a.test/", max_depth, 4).await;
            assert_eq!(as_set(&pages), set(&["https://a.test/", "https://a.test/b"]));
        }
    }

    #[tokio::test]
    async fn test_stylesheet_is_excluded() {
        let site = FakeSite::default()
            .page("https://a.test/", &["style.css", "/about"])
            .page("https://a.test/about", &[]);

        let config = CrawlConfig::new("https://a.test/", 3, 2);
        let result = crawl(&config, Arc::new(site)).await.unwrap();
        assert_eq!(
            as_set(&result.pages),
            set(&["https://a.test/", "https://a.test/about"])
        );
        assert_eq!(result.stats.skipped_ext, 1);
    }

    #[tokio::test]
    async fn test_non_html_page_is_listed_but_not_expanded() {
        let site = Arc::new(
            FakeSite::default()
                .page("https://a.test/", &["/download", "/about"])
                .not_html("https://a.test/download", "application/octet-stream")
                .page("https://a.test/about", &[]),
        );
        let config = CrawlConfig::new("https://a.test/", 5, 2);
        let result = crawl(&config, Arc::clone(&site) as Arc<dyn PageSource>)
            .await
            .unwrap();

        assert_eq!(
            as_set(&result.pages),
            set(&["https://a.test/", "https://a.test/download", "https://a.test/about"])
        );
        assert_eq!(site.fetches.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_failed_page_is_listed_but_not_expanded() {
        let site = FakeSite::default()
            .page("https://a.test/", &["/broken", "/ok"])
            .failing("https://a.test/broken", 500)
            .page("https://a.test/ok", &[]);

        let pages = run(site, "https://a.test/", 5, 2).await;
        assert_eq!(
            as_set(&pages),
            set(&["https://a.test/", "https://a.test/broken", "https://a.test/ok"])
        );
    }

    #[tokio::test]
    async fn test_failed_start_page_still_returns_start() {
        let site = FakeSite::default().failing("https://a.test/", 503);
        let pages = run(site, "https://a.test/", 3, 2).await;
        assert_eq!(pages, vec!["https://a.test/"]);
    }

    #[tokio::test]
    async fn test_other_hosts_and_schemes_are_skipped() {
        let site = FakeSite::default().page(
            "https://a.test/",
            &[
                "https://other.test/x",
                "//cdn.a.test/y",
                "mailto:me@a.test",
                "#top",
                "/x#section",
                "/x",
            ],
        );

        let pages = run(site, "https://a.test/", 2, 2).await;
        assert_eq!(as_set(&pages), set(&["https://a.test/", "https://a.test/x"]));
        assert!(pages.iter().all(|p| same_host("https://a.test/", p)));
    }

    #[tokio::test]
    async fn test_start_url_is_canonicalized() {
        // A link back to the canonical start must not be listed twice
        let site = FakeSite::default().page("https://a.test/", &["https://a.test/"]);
        let pages = run(site, "HTTPS://A.test#intro", 3, 1).await;
        assert_eq!(pages, vec!["https://a.test/"]);
    }

    #[tokio::test]
    async fn test_dense_graph_has_no_duplicates() {
        // 60 pages that all link to each other, crawled by many workers
        let urls: Vec<String> = (0..60).map(|i| format!("/p{}", i)).collect();
        let hrefs: Vec<&str> = urls.iter().map(String::as_str).collect();

        let mut site = FakeSite::default().page("https://a.test/", &hrefs);
        for href in &hrefs {
            site = site.page(&format!("https://a.test{}", href), &hrefs);
        }

        let site = Arc::new(site);
        let config = CrawlConfig::new("https://a.test/", 4, 16);
        let result = crawl(&config, Arc::clone(&site) as Arc<dyn PageSource>)
            .await
            .unwrap();

        assert_eq!(result.pages.len(), 61);
        assert_eq!(as_set(&result.pages).len(), 61);
        // Every page is fetched exactly once
        assert_eq!(site.fetches.load(Ordering::SeqCst), 61);
        assert_eq!(result.stats.queued, 0);
        assert_eq!(result.stats.scanned, 61);
    }

    #[tokio::test]
    async fn test_wide_fan_out_with_one_worker() {
        let urls: Vec<String> = (0..500).map(|i| format!("/item/{}", i)).collect();
        let hrefs: Vec<&str> = urls.iter().map(String::as_str).collect();
        let site = FakeSite::default().page("https://a.test/", &hrefs);

        let pages = run(site, "https://a.test/", 3, 1).await;
        assert_eq!(pages.len(), 501);
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let site: Arc<dyn PageSource> = Arc::new(FakeSite::default());

        for (url, workers) in [
            ("not a url", 1),
            ("ftp://a.test/", 1),
            ("mailto:x@a.test", 1),
            ("https://a.test/", 0),
        ] {
            let config = CrawlConfig::new(url, 2, workers);
            let result = crawl(&config, Arc::clone(&site)).await;
            assert!(
                matches!(result, Err(CrawlError::InvalidInput(_))),
                "{} / {} workers should be rejected",
                url,
                workers
            );
        }
    }

    #[tokio::test]
    async fn test_crawl_over_http() {
        use crate::fetch::{HttpFetcher, DEFAULT_TIMEOUT};
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let html = |body: &str| ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html");

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(html(
                r#"<a href="/about">About</a> <a href="/logo.png">Logo</a> <a href="/missing">Old</a>"#,
            ))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(html(r#"<a href="/">Home</a>"#))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let config = CrawlConfig::new(server.uri(), 3, 4);
        let result = crawl(&config, Arc::new(fetcher)).await.unwrap();

        let root = format!("{}/", server.uri());
        assert_eq!(result.pages[0], root);
        assert_eq!(
            as_set(&result.pages),
            [root.clone(), format!("{}about", root), format!("{}missing", root)]
                .into_iter()
                .collect::<HashSet<_>>()
        );
        assert_eq!(result.stats.skipped_ext, 1);
    }

    #[tokio::test]
    async fn test_stats_reporter_does_not_change_result() {
        let site = FakeSite::default()
            .page("https://a.test/", &["/b"])
            .page("https://a.test/b", &[]);
        let config = CrawlConfig::new("https://a.test/", 3, 2).with_stats(Duration::from_millis(1));
        let result = crawl(&config, Arc::new(site)).await.unwrap();
        assert_eq!(result.pages, vec!["https://a.test/", "https://a.test/b"]);
    }
}
