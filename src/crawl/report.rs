//! Download jobs and the per-run report.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use url::Url;

use crate::filename::NameSource;

/// A resolved PDF ready for the downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    /// URL of the task that produced the PDF.
    pub source_url: Url,
    /// URL the PDF was actually served from, after redirects.
    pub final_url: Url,
    /// Run-unique filename.
    pub filename: String,
    /// Output directory joined with `filename`.
    pub destination_path: PathBuf,
    /// Which filename rule applied.
    pub name_source: NameSource,
}

/// Why a URL was skipped without error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Content was neither PDF nor HTML.
    Unsupported {
        /// Content-Type header, if any.
        content_type: Option<String>,
    },
    /// A 3xx the fetcher could not follow.
    UnresolvedRedirect {
        /// Terminal status code.
        status: u16,
    },
    /// The final URL was already processed by another task.
    AlreadyProcessed {
        /// Normalized final URL.
        final_url: String,
    },
    /// The HTML page is beyond the configured depth cap.
    DepthLimit {
        /// Task depth.
        depth: u32,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported { content_type } => write!(
                f,
                "unsupported content type '{}'",
                content_type.as_deref().unwrap_or("none")
            ),
            Self::UnresolvedRedirect { status } => {
                write!(f, "redirect (HTTP {status}) could not be followed")
            }
            Self::AlreadyProcessed { final_url } => {
                write!(f, "already processed as {final_url}")
            }
            Self::DepthLimit { depth } => write!(f, "depth {depth} exceeds the crawl limit"),
        }
    }
}

/// Which stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Seed could not be parsed as a URL.
    Seed,
    /// Fetching the URL (network error, timeout, HTTP error).
    Fetch,
    /// Reading an HTML body.
    Page,
    /// Choosing a destination filename.
    Filename,
    /// Writing the PDF.
    Download,
}

/// A PDF that was written (or would be, in a dry run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedDownload {
    /// Task URL.
    pub source_url: String,
    /// Post-redirect URL.
    pub final_url: String,
    /// Filename within the output directory.
    pub filename: String,
    /// Full destination path.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
    /// Which filename rule applied.
    pub name_source: NameSource,
}

/// A URL skipped without error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedUrl {
    /// The URL.
    pub url: String,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// A URL or job that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedUrl {
    /// The URL.
    pub url: String,
    /// Where it failed.
    pub stage: FailureStage,
    /// Error message.
    pub error: String,
}

/// Per-seed result counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    /// Seed as given.
    pub seed: String,
    /// Successful downloads attributed to this seed.
    pub downloads: usize,
    /// Failures attributed to this seed.
    pub failures: usize,
}

/// Everything that happened in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Downloads that succeeded, in emission order.
    pub downloads: Vec<CompletedDownload>,
    /// URLs skipped without error.
    pub skipped: Vec<SkippedUrl>,
    /// URLs and jobs that failed.
    pub failed: Vec<FailedUrl>,
    /// One entry per distinct seed.
    pub seeds: Vec<SeedOutcome>,
    /// Total tasks created (seeds plus discovered links).
    pub tasks_created: usize,
    /// Successful HTTP responses, OJS shortcut attempts included.
    pub pages_fetched: usize,
}

impl RunReport {
    /// True if at least one seed produced a successful download.
    #[must_use]
    pub fn any_seed_succeeded(&self) -> bool {
        self.seeds.iter().any(|seed| seed.downloads > 0)
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error (not expected for this type).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn record_download(&mut self, seed: usize, download: CompletedDownload) {
        if let Some(outcome) = self.seeds.get_mut(seed) {
            outcome.downloads += 1;
        }
        self.downloads.push(download);
    }

    pub(crate) fn record_skip(&mut self, url: &Url, reason: SkipReason) {
        self.skipped.push(SkippedUrl {
            url: url.to_string(),
            reason,
        });
    }

    pub(crate) fn record_failure(
        &mut self,
        seed: Option<usize>,
        url: &str,
        stage: FailureStage,
        error: &dyn fmt::Display,
    ) {
        if let Some(outcome) = seed.and_then(|s| self.seeds.get_mut(s)) {
            outcome.failures += 1;
        }
        self.failed.push(FailedUrl {
            url: url.to_string(),
            stage,
            error: error.to_string(),
        });
    }
}
