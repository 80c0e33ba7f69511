//! pdfdl core library
//!
//! Crawls Open Journal Systems (OJS) sites from seed URLs and downloads the
//! PDF galleys it finds.
//!
//! # Architecture
//!
//! - [`fetch`] - HTTP GET with redirects, cookies and timeouts
//! - [`classify`] - PDF / HTML / redirect / unsupported decision
//! - [`extract`] - candidate links from an HTML page
//! - [`crawl`] - traversal engine, visited set and run report
//! - [`filename`] - run-unique destination filenames
//! - [`download`] - streaming the PDF body to disk

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod crawl;
pub mod download;
pub mod extract;
pub mod fetch;
pub mod filename;
pub mod user_agent;

// Re-export commonly used types
pub use classify::{ResourceKind, classify};
pub use crawl::{
    CrawlConfig, DownloadJob, FailureStage, ItemStatus, NoProgress, Progress, RunReport,
    SkipReason, TraversalEngine, normalize_url,
};
pub use download::{DownloadError, Downloader, DryRunDownloader, FileDownloader};
pub use extract::{ExtractedLink, LinkHint, extract_links};
pub use fetch::{FetchError, FetchResult, Fetcher, FetcherConfig, HttpFetcher};
pub use filename::{FilenameError, FilenameResolver, NameSource, ResolvedName};
pub use user_agent::default_user_agent;
