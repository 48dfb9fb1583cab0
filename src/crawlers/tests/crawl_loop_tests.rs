use crate::config::CrawlConfig;
use crate::crawlers::{Crawler, StopHandle};
use crate::error::CrawlError;
use crate::fetchers::{FetchError, PageFetcher, RenderedContent};
use crate::results::PageStatus;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// In-memory site: URL -> rendered HTML or a fetch failure. Unknown URLs fail.
#[derive(Clone, Default)]
struct FakeSite {
    pages: HashMap<String, Result<String, FetchError>>,
    fetched: Arc<Mutex<Vec<String>>>,
    stop_on_fetch: Option<StopHandle>,
    /// Holds every page except the root until enough fetches are in flight
    gate: Option<Arc<tokio::sync::Barrier>>,
}

impl FakeSite {
    fn page(mut self, url: &str, links: &[&str]) -> Self {
        let anchors: String = links
            .iter()
            .map(|href| format!(r#"<a href="{href}">link</a>"#))
            .collect();
        let html = format!(
            "<html><head><title>{url}</title></head><body><h1>{url}</h1>{anchors}</body></html>"
        );
        self.pages.insert(url.to_string(), Ok(html));
        self
    }

    fn failing(mut self, url: &str, error: FetchError) -> Self {
        self.pages.insert(url.to_string(), Err(error));
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &Url) -> Result<RenderedContent, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        let gated = url.path() != "/";
        if let Some(gate) = self.gate.as_ref().filter(|_| gated) {
            gate.wait().await;
        }
        if let Some(stop) = &self.stop_on_fetch {
            if self.gate.is_none() || gated {
                stop.stop();
            }
        }
        // Let other workers interleave
        tokio::task::yield_now().await;

        match self.pages.get(url.as_str()) {
            Some(Ok(html)) => Ok(RenderedContent::new(url.clone(), html.clone())),
            Some(Err(e)) => Err(e.clone()),
            None => Err(FetchError::Failed("HTTP 404".to_string())),
        }
    }
}

fn config(max_depth: usize) -> CrawlConfig {
    CrawlConfig::new(["https://a.com/"])
        .with_max_depth(max_depth)
        .with_request_pause(Duration::ZERO)
}

fn urls(report: &crate::crawlers::CrawlReport) -> Vec<&str> {
    report.dataset.iter().map(|r| r.url.as_str()).collect()
}

#[tokio::test]
async fn test_same_domain_links_within_depth() {
    let site = FakeSite::default()
        .page(
            "https://a.com/",
            &["/about", "https://other.com/x", "/about#top"],
        )
        .page("https://a.com/about", &["/", "/deeper"])
        .page("https://a.com/deeper", &[])
        .page("https://other.com/x", &[]);

    let crawler = Crawler::new(config(1)).unwrap();
    let report = crawler.run(std::slice::from_ref(&site)).await.unwrap();

    assert_eq!(urls(&report), vec!["https://a.com/", "https://a.com/about"]);
    let depths: Vec<usize> = report.dataset.iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![0, 1]);
    assert!(report.dataset.iter().all(|r| r.status() == PageStatus::Ok));
    assert_eq!(site.fetched(), vec!["https://a.com/", "https://a.com/about"]);
    assert!(!report.cancelled);
    assert!(!report.drained);
    assert_eq!(report.unvisited, 0);
}

#[tokio::test]
async fn test_seed_timeout_yields_single_record() {
    let site = FakeSite::default().failing(
        "https://a.com/",
        FetchError::Timeout("page load timeout (30s)".to_string()),
    );

    let crawler = Crawler::new(config(3)).unwrap();
    let report = crawler.run(&[site]).await.unwrap();

    assert_eq!(report.dataset.len(), 1);
    let record = &report.dataset.records()[0];
    assert_eq!(record.status(), PageStatus::Timeout);
    assert_eq!(record.error_detail(), Some("page load timeout (30s)"));
    assert!(record.fields().is_none());
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_link_found_by_two_pages_is_crawled_once() {
    let site = FakeSite::default()
        .page("https://a.com/", &["/a", "/b"])
        .page("https://a.com/a", &["/c"])
        .page("https://a.com/b", &["/c", "/a"])
        .page("https://a.com/c", &["/a", "/b", "/"]);

    let crawler = Crawler::new(config(2)).unwrap();
    let report = crawler.run(std::slice::from_ref(&site)).await.unwrap();

    assert_eq!(
        urls(&report),
        vec![
            "https://a.com/",
            "https://a.com/a",
            "https://a.com/b",
            "https://a.com/c"
        ]
    );
    assert_eq!(site.fetched().len(), 4);
}

#[tokio::test]
async fn test_pages_beyond_max_depth_are_never_fetched() {
    let site = FakeSite::default()
        .page("https://a.com/", &["/1"])
        .page("https://a.com/1", &["/2"])
        .page("https://a.com/2", &["/3"])
        .page("https://a.com/3", &[]);

    let crawler = Crawler::new(config(2)).unwrap();
    let report = crawler.run(std::slice::from_ref(&site)).await.unwrap();

    assert_eq!(
        urls(&report),
        vec!["https://a.com/", "https://a.com/1", "https://a.com/2"]
    );
    assert!(report.dataset.iter().all(|r| r.depth <= 2));
    assert!(!site.fetched().contains(&"https://a.com/3".to_string()));
}

#[tokio::test]
async fn test_failed_pages_are_recorded_and_crawl_continues() {
    let site = FakeSite::default()
        .page("https://a.com/", &["/broken", "/missing", "/fine"])
        .failing(
            "https://a.com/broken",
            FetchError::Failed("net::ERR_CONNECTION_RESET".to_string()),
        )
        .page("https://a.com/fine", &[]);

    let crawler = Crawler::new(config(1)).unwrap();
    let report = crawler.run(&[site]).await.unwrap();

    let statuses: Vec<(&str, PageStatus)> = report
        .dataset
        .iter()
        .map(|r| (r.url.as_str(), r.status()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("https://a.com/", PageStatus::Ok),
            ("https://a.com/broken", PageStatus::Error),
            ("https://a.com/missing", PageStatus::Error),
            ("https://a.com/fine", PageStatus::Ok),
        ]
    );
    assert_eq!(
        report.dataset.get("https://a.com/broken").unwrap().error_detail(),
        Some("net::ERR_CONNECTION_RESET")
    );
}

#[tokio::test]
async fn test_malformed_and_excluded_links_are_skipped() {
    let site = FakeSite::default()
        .page(
            "https://a.com/",
            &[
                "http://[::1",
                "mailto:hello@a.com",
                "tel:+15555550100",
                "/report.pdf",
                "/post?share=facebook",
                "/ok",
            ],
        )
        .page("https://a.com/ok", &[]);

    let crawler = Crawler::new(config(1)).unwrap();
    let report = crawler.run(std::slice::from_ref(&site)).await.unwrap();

    assert_eq!(urls(&report), vec!["https://a.com/", "https://a.com/ok"]);
}

#[tokio::test]
async fn test_stop_request_ends_crawl_after_page_in_flight() {
    let crawler = Crawler::new(config(2)).unwrap();
    let site = FakeSite {
        stop_on_fetch: Some(crawler.stop_handle()),
        ..FakeSite::default()
    }
    .page("https://a.com/", &["/a", "/b"])
    .page("https://a.com/a", &[])
    .page("https://a.com/b", &[]);

    let report = crawler.run(std::slice::from_ref(&site)).await.unwrap();

    assert_eq!(urls(&report), vec!["https://a.com/"]);
    assert!(report.cancelled);
    assert_eq!(report.unvisited, 2);
    assert!(!report.drained);
    assert_eq!(site.fetched().len(), 1);
}

#[tokio::test]
async fn test_stop_drains_pages_in_flight_on_other_workers() {
    let crawler = Crawler::new(config(2).with_concurrency(2)).unwrap();
    let site = FakeSite {
        stop_on_fetch: Some(crawler.stop_handle()),
        gate: Some(Arc::new(tokio::sync::Barrier::new(2))),
        ..FakeSite::default()
    }
    .page("https://a.com/", &["/a", "/b", "/c"])
    .page("https://a.com/a", &[])
    .page("https://a.com/b", &[])
    .page("https://a.com/c", &[]);
    let workers = vec![site.clone(), site.clone()];

    let report = crawler.run(&workers).await.unwrap();

    let crawled: HashSet<&str> = urls(&report).into_iter().collect();
    let expected: HashSet<&str> = ["https://a.com/", "https://a.com/a", "https://a.com/b"]
        .into_iter()
        .collect();
    assert_eq!(crawled, expected);
    assert_eq!(report.dataset.len(), 3);
    assert!(report.dataset.iter().all(|r| r.status() == PageStatus::Ok));
    assert!(!site.fetched().contains(&"https://a.com/c".to_string()));
    assert_eq!(site.fetched().len(), 3);
    assert_eq!(report.unvisited, 1);
    assert!(report.cancelled);
    assert!(report.drained);
}

#[tokio::test(start_paused = true)]
async fn test_pause_follows_every_page_including_failures() {
    let site = FakeSite::default()
        .page("https://a.com/", &["/broken", "/fine"])
        .failing(
            "https://a.com/broken",
            FetchError::Failed("net::ERR_CONNECTION_RESET".to_string()),
        )
        .page("https://a.com/fine", &[]);
    let config = config(1).with_request_pause(Duration::from_millis(200));

    let crawler = Crawler::new(config).unwrap();
    let start = tokio::time::Instant::now();
    let report = crawler.run(&[site]).await.unwrap();

    assert_eq!(report.dataset.len(), 3);
    assert_eq!(report.dataset.status_counts(), (2, 0, 1));
    assert!(start.elapsed() >= Duration::from_millis(600));
}

#[tokio::test(start_paused = true)]
async fn test_stop_request_cuts_pause_short() {
    let site = FakeSite::default()
        .page("https://a.com/", &["/a"])
        .page("https://a.com/a", &[]);
    let config = config(1).with_request_pause(Duration::from_secs(3600));

    let crawler = Crawler::new(config).unwrap();
    let stop = crawler.stop_handle();
    let start = tokio::time::Instant::now();
    let (report, ()) = tokio::join!(crawler.run(std::slice::from_ref(&site)), async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        stop.stop();
    });
    let report = report.unwrap();

    assert!(start.elapsed() < Duration::from_secs(3600));
    assert_eq!(urls(&report), vec!["https://a.com/"]);
    assert_eq!(site.fetched(), vec!["https://a.com/"]);
    assert!(report.cancelled);
    assert!(!report.drained);
    assert_eq!(report.unvisited, 1);
}

#[tokio::test]
async fn test_multiple_workers_visit_each_url_once() {
    let site = FakeSite::default()
        .page("https://a.com/", &["/a", "/b", "/c", "/d"])
        .page("https://a.com/a", &["/", "/e"])
        .page("https://a.com/b", &["/", "/e"])
        .page("https://a.com/c", &["/e", "/a"])
        .page("https://a.com/d", &["/e"])
        .page("https://a.com/e", &["/"]);
    let workers = vec![site.clone(), site.clone(), site.clone()];

    let crawler = Crawler::new(config(2).with_concurrency(3)).unwrap();
    let report = crawler.run(&workers).await.unwrap();

    let crawled: HashSet<&str> = urls(&report).into_iter().collect();
    let expected: HashSet<&str> = [
        "https://a.com/",
        "https://a.com/a",
        "https://a.com/b",
        "https://a.com/c",
        "https://a.com/d",
        "https://a.com/e",
    ]
    .into_iter()
    .collect();
    assert_eq!(crawled, expected);
    assert_eq!(report.dataset.len(), 6);
    assert_eq!(site.fetched().len(), 6);
}

#[tokio::test]
async fn test_run_requires_a_fetcher() {
    let crawler = Crawler::new(config(1)).unwrap();
    let result = crawler.run::<FakeSite>(&[]).await;
    assert!(matches!(result, Err(CrawlError::Config(_))));
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let result = Crawler::new(CrawlConfig::new(["not a url"]));
    assert!(matches!(result, Err(CrawlError::Config(_))));
}
