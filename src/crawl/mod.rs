//! Breadth-first crawl from seed URLs to PDF download jobs.
//!
//! This module provides:
//! - [`TraversalEngine`] - sequential fetch/classify/extract loop
//! - [`TaskArena`] - FIFO of crawl tasks addressed by [`TaskId`]
//! - [`VisitedSet`] - enqueued and fetched URL tracking
//! - [`RunReport`] - downloads, skips and failures for one run
//! - [`Progress`] - hook for progress display

mod engine;
mod ojs;
mod progress;
mod report;
mod task;
mod visited;

pub use engine::{CrawlConfig, TraversalEngine};
pub use ojs::galley_download_url;
pub use progress::{ItemStatus, NoProgress, Progress};
pub use report::{
    CompletedDownload, DownloadJob, FailedUrl, FailureStage, RunReport, SeedOutcome, SkipReason,
    SkippedUrl,
};
pub use task::{CrawlTask, TaskArena, TaskId};
pub use visited::{VisitedSet, normalize_url};
