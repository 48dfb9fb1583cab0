use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be crawled, with its distance from the seeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: usize,
}

impl CrawlTask {
    pub fn new(url: Url, depth: usize) -> Self {
        Self { url, depth }
    }

    /// Task for a link found on this task's page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

/// Breadth-first traversal state: a FIFO queue plus the set of URLs already processed.
///
/// A URL is tracked in `enqueued` from the moment it is offered, so two pages linking
/// to the same unseen URL only queue it once.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<CrawlTask>,
    visited: HashSet<String>,
    enqueued: HashSet<String>,
    max_depth: usize,
}

impl Frontier {
    pub fn new(max_depth: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            enqueued: HashSet::new(),
            max_depth,
        }
    }

    /// Queue every seed at depth 0
    pub fn seed<I: IntoIterator<Item = Url>>(&mut self, urls: I) {
        for url in urls {
            self.offer(CrawlTask::new(url, 0));
        }
    }

    /// Remove and return the oldest task
    pub fn pop(&mut self) -> Option<CrawlTask> {
        self.queue.pop_front()
    }

    /// Record a URL as processed. Returns false if it was already visited.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    /// Queue a task unless it is too deep, already visited or already queued
    pub fn offer(&mut self, task: CrawlTask) -> bool {
        if task.depth > self.max_depth {
            ::log::trace!("Not queuing {} at depth {}", task.url, task.depth);
            return false;
        }

        let key = task.url.as_str();
        if self.visited.contains(key) || self.enqueued.contains(key) {
            return false;
        }

        self.enqueued.insert(key.to_string());
        self.queue.push_back(task);
        true
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of queued tasks
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
