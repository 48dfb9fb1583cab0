use crate::config::CrawlConfig;
use crate::crawlers::crawler::{CrawlReport, CrawlState, StopHandle};
use crate::error::CrawlError;
use crate::fetchers::{FetchError, PageFetcher};
use crate::filter::UrlFilter;
use crate::frontier::{CrawlTask, Frontier};
use crate::parsers::{FieldExtractor, HtmlExtractor};
use crate::results::{Dataset, PageRecord};
use futures::future::join_all;
use std::time::Duration;
use tokio::sync::{Mutex, Notify, watch};
use url::Url;

/// Traversal state shared by the workers of one run
struct Shared {
    frontier: Frontier,
    dataset: Dataset,
    in_flight: usize,
    state: CrawlState,
    drained: bool,
}

impl Shared {
    /// Pops the next task worth fetching and marks it visited in the same step
    fn next_task(&mut self) -> Option<CrawlTask> {
        while let Some(task) = self.frontier.pop() {
            if task.depth > self.frontier.max_depth() {
                ::log::debug!("Discarding {} beyond max depth ({})", task.url, task.depth);
                continue;
            }
            if !self.frontier.mark_visited(&task.url) {
                ::log::debug!("Discarding already visited: {}", task.url);
                continue;
            }
            self.in_flight += 1;
            return Some(task);
        }
        None
    }

    fn set_state(&mut self, state: CrawlState) {
        if self.state != state {
            ::log::info!("Crawl state: {} -> {}", self.state, state);
            self.drained |= state == CrawlState::Draining;
            self.state = state;
        }
    }
}

enum Next<'a> {
    Task(CrawlTask),
    Wait(tokio::sync::futures::Notified<'a>),
    Finished,
}

/// Depth-bounded breadth-first crawler.
///
/// With one fetcher the dataset is in strict BFS order. With several, each fetcher is driven
/// by its own worker and the dataset is in completion order.
pub struct Crawler<X = HtmlExtractor> {
    config: CrawlConfig,
    filter: UrlFilter,
    extractor: X,
    stop: StopHandle,
}

impl Crawler<HtmlExtractor> {
    /// Crawler using the built-in HTML extractor
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        let extractor = HtmlExtractor::new(config.body_text_limit);
        Self::with_extractor(config, extractor)
    }
}

impl<X: FieldExtractor> Crawler<X> {
    pub fn with_extractor(config: CrawlConfig, extractor: X) -> Result<Self, CrawlError> {
        config.validate()?;
        let filter = UrlFilter::for_crawl(&config)?;
        Ok(Self {
            config,
            filter,
            extractor,
            stop: StopHandle::new(),
        })
    }

    /// Handle for stopping the crawl from elsewhere (e.g. a Ctrl-C handler)
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawls from the configured seeds using one worker per fetcher.
    ///
    /// Fetch failures become records; only an unusable setup is an error.
    pub async fn run<F: PageFetcher>(&self, fetchers: &[F]) -> Result<CrawlReport, CrawlError> {
        if fetchers.is_empty() {
            return Err(CrawlError::Config(
                "at least one page fetcher is required".to_string(),
            ));
        }

        let mut frontier = Frontier::new(self.config.max_depth);
        frontier.seed(self.config.parsed_seeds()?);

        let shared = Mutex::new(Shared {
            frontier,
            dataset: Dataset::new(),
            in_flight: 0,
            state: CrawlState::Idle,
            drained: false,
        });
        shared.lock().await.set_state(CrawlState::Running);

        ::log::info!(
            "Starting crawl of {} with {} worker(s), max depth {}",
            self.filter.base_domain(),
            fetchers.len(),
            self.config.max_depth
        );

        let notify = Notify::new();
        let workers = fetchers
            .iter()
            .enumerate()
            .map(|(worker_id, fetcher)| self.worker(worker_id, fetcher, &shared, &notify));
        join_all(workers).await;

        let mut shared = shared.into_inner();
        shared.set_state(CrawlState::Done);

        let cancelled = self.stop.is_stopped();
        let unvisited = shared.frontier.len();
        let (ok, timeout, error) = shared.dataset.status_counts();
        ::log::info!(
            "Crawl finished: {} pages ({} ok, {} timeout, {} error), {} left in queue{}",
            shared.dataset.len(),
            ok,
            timeout,
            error,
            unvisited,
            if cancelled { ", cancelled" } else { "" }
        );

        Ok(CrawlReport {
            dataset: shared.dataset,
            cancelled,
            drained: shared.drained,
            unvisited,
        })
    }

    async fn worker<F: PageFetcher>(
        &self,
        worker_id: usize,
        fetcher: &F,
        shared: &Mutex<Shared>,
        notify: &Notify,
    ) {
        ::log::debug!("Worker {} starting", worker_id);
        let mut stop_rx = self.stop.subscribe();

        loop {
            let next = {
                let mut s = shared.lock().await;
                if *stop_rx.borrow() {
                    if s.in_flight > 0 {
                        s.set_state(CrawlState::Draining);
                    }
                    Next::Finished
                } else {
                    match s.next_task() {
                        Some(task) => Next::Task(task),
                        None if s.in_flight == 0 => Next::Finished,
                        // Another worker may still discover links
                        None => Next::Wait(notify.notified()),
                    }
                }
            };

            match next {
                Next::Task(task) => {
                    self.process_task(worker_id, fetcher, task, shared).await;
                    notify.notify_waiters();
                    pause(self.config.request_pause(), &mut stop_rx).await;
                }
                Next::Wait(notified) => {
                    tokio::select! {
                        _ = notified => {}
                        _ = stop_rx.changed() => {}
                    }
                }
                Next::Finished => {
                    notify.notify_waiters();
                    break;
                }
            }
        }

        ::log::debug!("Worker {} completed processing loop", worker_id);
    }

    async fn process_task<F: PageFetcher>(
        &self,
        worker_id: usize,
        fetcher: &F,
        task: CrawlTask,
        shared: &Mutex<Shared>,
    ) {
        ::log::info!("Crawling: {} (depth {})", task.url, task.depth);
        let url = task.url.as_str();

        let (record, links) = match fetcher.fetch(&task.url).await {
            Ok(content) => {
                let extraction = self.extractor.extract(&content);
                ::log::info!("Found {} links in {}", extraction.links.len(), url);
                (
                    PageRecord::ok(url, task.depth, extraction.fields),
                    extraction.links,
                )
            }
            Err(e) => {
                ::log::warn!(
                    "Worker {} skipping link discovery: {}",
                    worker_id,
                    e.clone().into_crawl_error(&task.url)
                );
                let record = match e {
                    FetchError::Timeout(detail) => PageRecord::timeout(url, task.depth, detail),
                    FetchError::Failed(detail) => PageRecord::error(url, task.depth, detail),
                };
                (record, Vec::new())
            }
        };

        let candidates = if task.depth < self.config.max_depth {
            self.resolve_links(&task.url, &links)
        } else {
            if !links.is_empty() {
                ::log::debug!("Not following links from {} at max depth", url);
            }
            Vec::new()
        };

        let mut s = shared.lock().await;
        s.dataset.push(record);
        let mut queued = 0;
        for candidate in candidates {
            if !self.filter.accept(&candidate, s.frontier.visited()) {
                ::log::trace!("URL filter rejected: {}", candidate);
                continue;
            }
            if s.frontier.offer(task.child(candidate)) {
                queued += 1;
            }
        }
        s.in_flight -= 1;
        ::log::debug!(
            "Queued {} new links from {}, {} waiting",
            queued,
            url,
            s.frontier.len()
        );
    }

    /// Resolves hrefs against the page URL, skipping the ones that cannot be resolved
    fn resolve_links(&self, page: &Url, links: &[String]) -> Vec<Url> {
        links
            .iter()
            .filter_map(|href| match self.filter.normalize(page, href) {
                Ok(url) => Some(url),
                Err(e) => {
                    ::log::warn!("Skipping link: {}", e);
                    None
                }
            })
            .collect()
    }
}

/// Inter-request pause; cut short by a stop request
async fn pause(duration: Duration, stop_rx: &mut watch::Receiver<bool>) {
    if duration.is_zero() || *stop_rx.borrow() {
        return;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => {}
        _ = stop_rx.changed() => {}
    }
}
