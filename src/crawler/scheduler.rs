//! Scheduler for managing the crawl frontier and pacing
//!
//! This module handles:
//! - FIFO frontier of (url, depth) tasks, giving breadth-first order
//! - The visited set, keyed by normalized URL
//! - Enforcing the depth limit at enqueue time
//! - The fixed delay between processed batches

use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use url::Url;

/// A URL waiting on the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Normalized URL to fetch
    pub url: Url,

    /// Link distance from the base URL (0 for the base itself)
    pub depth: u32,

    /// Redirect hops taken to reach this URL from the linked one
    pub redirects: u32,
}

impl CrawlTask {
    pub fn new(url: Url, depth: u32) -> Self {
        Self {
            url,
            depth,
            redirects: 0,
        }
    }
}

/// Normalized URLs already handed out for fetching
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` visited; returns false if it already was
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(url.as_str().to_string())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Scheduler owns the frontier and the visited set
///
/// The crawl loop is the only owner, so check-and-insert on either structure
/// never races even when page processing runs on several workers.
#[derive(Debug)]
pub struct Scheduler {
    frontier: VecDeque<CrawlTask>,
    visited: VisitedSet,
    max_depth: u32,
    pacing: Duration,
}

impl Scheduler {
    /// Creates a scheduler seeded with the base URL at depth 0
    pub fn new(seed: Url, max_depth: u32, pacing: Duration) -> Self {
        let mut frontier = VecDeque::new();
        frontier.push_back(CrawlTask::new(seed, 0));

        Self {
            frontier,
            visited: VisitedSet::new(),
            max_depth,
            pacing,
        }
    }

    /// Pops up to `size` unvisited tasks, marking each one visited
    ///
    /// Tasks whose URL was visited since they were enqueued are dropped.
    pub fn next_batch(&mut self, size: usize) -> Vec<CrawlTask> {
        let mut batch = Vec::with_capacity(size);

        while batch.len() < size {
            let Some(task) = self.frontier.pop_front() else {
                break;
            };

            if !self.visited.insert(&task.url) {
                tracing::trace!("Skipping already visited {}", task.url);
                continue;
            }

            batch.push(task);
        }

        batch
    }

    /// Enqueues links discovered on a page at `parent_depth`
    ///
    /// Nothing is enqueued when the children would exceed the depth limit.
    /// Links already visited are skipped; links already waiting on the
    /// frontier are left to the dequeue check.
    ///
    /// # Returns
    ///
    /// The number of tasks added
    pub fn enqueue_links(&mut self, parent_depth: u32, links: Vec<Url>) -> usize {
        let depth = parent_depth + 1;
        if depth > self.max_depth {
            if !links.is_empty() {
                tracing::trace!(
                    "Not enqueueing {} links at depth {} (limit {})",
                    links.len(),
                    depth,
                    self.max_depth
                );
            }
            return 0;
        }

        let mut added = 0;
        for url in links {
            if self.visited.contains(&url) {
                continue;
            }
            self.frontier.push_back(CrawlTask::new(url, depth));
            added += 1;
        }
        added
    }

    /// Queues the target of a redirect from `from` at the same depth
    ///
    /// The target goes to the front of the frontier so the page is handled
    /// where its link was. Visited targets are dropped, as are chains longer
    /// than `max_redirects`.
    ///
    /// # Returns
    ///
    /// True if the target was queued
    pub fn enqueue_redirect(
        &mut self,
        from: &CrawlTask,
        target: Url,
        max_redirects: u32,
    ) -> bool {
        if from.redirects >= max_redirects {
            tracing::warn!(
                "Too many redirects from {} (limit {}), dropping {}",
                from.url,
                max_redirects,
                target
            );
            return false;
        }
        if self.visited.contains(&target) {
            tracing::debug!("Redirect target {} already visited", target);
            return false;
        }

        self.frontier.push_front(CrawlTask {
            url: target,
            depth: from.depth,
            redirects: from.redirects + 1,
        });
        true
    }

    /// Waits the pacing delay, unless the crawl is about to end
    pub async fn pace(&self) {
        if !self.frontier.is_empty() && !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }
    }

    /// Returns the number of tasks in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
