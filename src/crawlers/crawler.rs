use crate::results::Dataset;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Created, frontier not seeded yet
    Idle,
    /// Popping and processing tasks
    Running,
    /// Stop requested; waiting for pages in flight
    Draining,
    /// Frontier exhausted or drained after a stop
    Done,
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrawlState::Idle => "idle",
            CrawlState::Running => "running",
            CrawlState::Draining => "draining",
            CrawlState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Asks a running crawl to stop popping new tasks. Cheap to clone.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// What a finished crawl produced
#[derive(Debug)]
pub struct CrawlReport {
    pub dataset: Dataset,
    /// True if the crawl ended because of a stop request
    pub cancelled: bool,
    /// True if pages were still in flight when the stop was seen
    pub drained: bool,
    /// Tasks still queued when the crawl ended
    pub unvisited: usize,
}
