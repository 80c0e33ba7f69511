//! Progress reporting hooks for the traversal engine.

use url::Url;

use crate::classify::ResourceKind;

/// Status of one processed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// About to fetch.
    Fetching,
    /// Classified; carries what it turned out to be.
    Classified(ResourceKind),
    /// A PDF was written.
    Downloaded,
    /// Skipped without error.
    Skipped,
    /// Failed.
    Failed,
}

/// Receives progress updates. `total_estimate` grows as links are found.
pub trait Progress: Send + Sync {
    /// Called as each task moves through the engine.
    fn update(&self, current: usize, total_estimate: usize, url: &Url, status: ItemStatus);

    /// Called once when the queue is exhausted.
    fn finish(&self) {}
}

/// Ignores all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn update(&self, _current: usize, _total_estimate: usize, _url: &Url, _status: ItemStatus) {}
}
