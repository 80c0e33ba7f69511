//! Traversal engine: turns seed URLs into downloaded PDFs.
//!
//! # Overview
//!
//! The engine owns a FIFO of [`CrawlTask`]s (stored in a [`TaskArena`]), a
//! [`VisitedSet`] and the [`RunReport`]. For each task it fetches the URL,
//! classifies the response and then:
//!
//! - `DirectPdf`: resolves a run-unique filename, emits a [`DownloadJob`]
//!   and hands the body to the [`Downloader`];
//! - `HtmlPage`: extracts links with the final URL as base and enqueues the
//!   ones not seen before, one level deeper;
//! - `Redirect` / `Unsupported`: records a skip.
//!
//! Every per-URL failure is recorded in the report and the crawl continues.
//! Processing is sequential, so jobs come out breadth-first in seed order and
//! document order.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pdfdl_core::{CrawlConfig, FetcherConfig, FileDownloader, FilenameResolver, HttpFetcher, TraversalEngine};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Arc::new(HttpFetcher::new(&FetcherConfig::default())?);
//! let engine = TraversalEngine::new(fetcher, Arc::new(FileDownloader::new()), CrawlConfig::default());
//! let report = engine
//!     .run(
//!         &["https://journal.example/index.php/j/issue/view/12".to_string()],
//!         FilenameResolver::new("./pdfs", false),
//!     )
//!     .await;
//! println!("downloaded {} PDFs", report.downloads.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, error, info, instrument, trace, warn};
use url::Url;

use super::ojs::galley_download_url;
use super::progress::{ItemStatus, NoProgress, Progress};
use super::report::{
    CompletedDownload, DownloadJob, FailureStage, RunReport, SeedOutcome, SkipReason,
};
use super::task::{CrawlTask, TaskArena};
use super::visited::{VisitedSet, normalize_url};
use crate::classify::{ResourceKind, classify};
use crate::download::Downloader;
use crate::extract::{LinkHint, extract_links};
use crate::fetch::{FetchResult, Fetcher};
use crate::filename::FilenameResolver;

/// Crawl behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Deepest level whose links are still expanded; `None` is unbounded.
    pub max_depth: Option<u32>,
    /// Try the OJS galley download path before fetching a galley viewer.
    pub ojs_shortcut: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            ojs_shortcut: true,
        }
    }
}

/// Sequential crawl orchestrator.
pub struct TraversalEngine {
    fetcher: Arc<dyn Fetcher>,
    downloader: Arc<dyn Downloader>,
    progress: Arc<dyn Progress>,
    config: CrawlConfig,
}

/// Mutable state for one `run`; dropped when it returns.
struct CrawlRun {
    arena: TaskArena,
    visited: VisitedSet,
    report: RunReport,
    names: FilenameResolver,
    processed: usize,
}

impl TraversalEngine {
    /// Creates an engine. Progress updates are discarded until
    /// [`with_progress`](Self::with_progress) is called.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        downloader: Arc<dyn Downloader>,
        config: CrawlConfig,
    ) -> Self {
        debug!(
            max_depth = ?config.max_depth,
            ojs_shortcut = config.ojs_shortcut,
            "creating traversal engine"
        );
        Self {
            fetcher,
            downloader,
            progress: Arc::new(NoProgress),
            config,
        }
    }

    /// Attaches a progress sink.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Crawls from `seeds` until the queue is empty.
    ///
    /// Never fails: bad seeds, network errors and write errors are recorded in
    /// the returned report.
    #[instrument(skip(self, seeds, names), fields(seeds = seeds.len()))]
    pub async fn run(&self, seeds: &[String], names: FilenameResolver) -> RunReport {
        let mut run = CrawlRun {
            arena: TaskArena::new(),
            visited: VisitedSet::new(),
            report: RunReport::default(),
            names,
            processed: 0,
        };

        Self::seed(&mut run, seeds);

        while let Some(id) = run.arena.pop() {
            let Some(task) = run.arena.get(id).cloned() else {
                continue;
            };
            if run.visited.was_fetched(&task.normalized) {
                trace!(url = %task.url, "already fetched through a redirect, discarding");
                continue;
            }
            run.processed += 1;
            self.notify(&run, &task.url, ItemStatus::Fetching);

            if self.config.ojs_shortcut
                && let Some(download_url) = galley_download_url(&task.url)
                && self.try_galley_download(&mut run, &task, download_url).await
            {
                continue;
            }

            self.process_task(&mut run, &task).await;
        }

        self.progress.finish();
        run.report.tasks_created = run.arena.created();
        info!(
            downloads = run.report.downloads.len(),
            skipped = run.report.skipped.len(),
            failed = run.report.failed.len(),
            tasks = run.report.tasks_created,
            "crawl finished"
        );
        run.report
    }

    fn seed(run: &mut CrawlRun, seeds: &[String]) {
        for raw in seeds {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let parsed = Url::parse(raw).map_err(|e| e.to_string()).and_then(|url| {
                if matches!(url.scheme(), "http" | "https") {
                    Ok(url)
                } else {
                    Err(format!("unsupported scheme '{}'", url.scheme()))
                }
            });

            let seed_index = run.report.seeds.len();
            match parsed {
                Ok(url) => {
                    let normalized = normalize_url(&url);
                    if !run.visited.mark_enqueued(&normalized) {
                        debug!(seed = raw, "duplicate seed ignored");
                        continue;
                    }
                    run.report.seeds.push(SeedOutcome {
                        seed: raw.to_string(),
                        downloads: 0,
                        failures: 0,
                    });
                    run.arena.push(url, normalized, 0, None, seed_index, None);
                }
                Err(reason) => {
                    warn!(seed = raw, %reason, "invalid seed URL");
                    run.report.seeds.push(SeedOutcome {
                        seed: raw.to_string(),
                        downloads: 0,
                        failures: 0,
                    });
                    run.report
                        .record_failure(Some(seed_index), raw, FailureStage::Seed, &reason);
                }
            }
        }
        info!(queued = run.arena.pending(), "seeded crawl queue");
    }

    async fn process_task(&self, run: &mut CrawlRun, task: &CrawlTask) {
        run.visited.mark_fetched(&task.normalized);

        let result = match self.fetcher.fetch(&task.url).await {
            Ok(result) => result,
            Err(e) => {
                warn!(url = %task.url, error = %e, "fetch failed");
                run.report.record_failure(
                    Some(task.seed),
                    task.url.as_str(),
                    FailureStage::Fetch,
                    &e,
                );
                self.notify(run, &task.url, ItemStatus::Failed);
                return;
            }
        };
        run.report.pages_fetched += 1;

        let final_normalized = normalize_url(&result.final_url);
        if final_normalized != task.normalized && !run.visited.mark_fetched(&final_normalized) {
            debug!(url = %task.url, final_url = %result.final_url, "redirect target already processed");
            run.report.record_skip(
                &task.url,
                SkipReason::AlreadyProcessed {
                    final_url: final_normalized,
                },
            );
            self.notify(run, &task.url, ItemStatus::Skipped);
            return;
        }

        let kind = classify(&result);
        debug!(url = %task.url, final_url = %result.final_url, %kind, "classified");
        self.notify(run, &task.url, ItemStatus::Classified(kind));

        match kind {
            ResourceKind::DirectPdf => self.handle_pdf(run, task, result).await,
            ResourceKind::HtmlPage => self.handle_page(run, task, result).await,
            ResourceKind::Redirect => {
                let reason = SkipReason::UnresolvedRedirect {
                    status: result.status.as_u16(),
                };
                warn!(url = %task.url, %reason, "skipping");
                run.report.record_skip(&task.url, reason);
                self.notify(run, &task.url, ItemStatus::Skipped);
            }
            ResourceKind::Unsupported => {
                let reason = SkipReason::Unsupported {
                    content_type: result.content_type().map(str::to_string),
                };
                warn!(url = %task.url, %reason, "skipping");
                run.report.record_skip(&task.url, reason);
                self.notify(run, &task.url, ItemStatus::Skipped);
            }
        }
    }

    /// Returns true when the galley download path produced a PDF and the
    /// viewer page no longer needs fetching.
    async fn try_galley_download(
        &self,
        run: &mut CrawlRun,
        task: &CrawlTask,
        download_url: Url,
    ) -> bool {
        let download_normalized = normalize_url(&download_url);
        if run.visited.was_fetched(&download_normalized) {
            return false;
        }

        debug!(url = %task.url, download_url = %download_url, "trying OJS galley download");
        let result = match self.fetcher.fetch(&download_url).await {
            Ok(result) => result,
            Err(e) => {
                debug!(download_url = %download_url, error = %e, "galley download failed, falling back to viewer");
                run.visited.mark_fetched(&download_normalized);
                return false;
            }
        };
        run.report.pages_fetched += 1;
        run.visited.mark_fetched(&download_normalized);
        if classify(&result) != ResourceKind::DirectPdf {
            debug!(download_url = %download_url, "galley download is not a PDF, falling back to viewer");
            return false;
        }

        run.visited.mark_fetched(&task.normalized);
        let final_normalized = normalize_url(&result.final_url);
        if final_normalized != download_normalized && !run.visited.mark_fetched(&final_normalized)
        {
            run.report.record_skip(
                &task.url,
                SkipReason::AlreadyProcessed {
                    final_url: final_normalized,
                },
            );
            self.notify(run, &task.url, ItemStatus::Skipped);
            return true;
        }

        info!(url = %task.url, download_url = %download_url, "galley download resolved to PDF");
        self.notify(run, &task.url, ItemStatus::Classified(ResourceKind::DirectPdf));
        self.handle_pdf(run, task, result).await;
        true
    }

    async fn handle_pdf(&self, run: &mut CrawlRun, task: &CrawlTask, result: FetchResult) {
        let resolved = match run.names.resolve(&result) {
            Ok(resolved) => resolved,
            Err(e) => {
                error!(url = %result.final_url, error = %e, "filename resolution failed");
                run.report.record_failure(
                    Some(task.seed),
                    result.final_url.as_str(),
                    FailureStage::Filename,
                    &e,
                );
                self.notify(run, &task.url, ItemStatus::Failed);
                return;
            }
        };

        let job = DownloadJob {
            source_url: task.url.clone(),
            final_url: result.final_url.clone(),
            filename: resolved.filename,
            destination_path: resolved.path,
            name_source: resolved.source,
        };
        info!(
            url = %job.final_url,
            filename = %job.filename,
            depth = task.depth,
            "PDF found"
        );

        match self.downloader.download(&job, result.body).await {
            Ok(bytes) => {
                run.report.record_download(
                    task.seed,
                    CompletedDownload {
                        source_url: job.source_url.to_string(),
                        final_url: job.final_url.to_string(),
                        filename: job.filename,
                        path: job.destination_path,
                        bytes,
                        name_source: job.name_source,
                    },
                );
                self.notify(run, &task.url, ItemStatus::Downloaded);
            }
            Err(e) => {
                warn!(url = %job.final_url, error = %e, "download failed");
                run.report.record_failure(
                    Some(task.seed),
                    job.final_url.as_str(),
                    FailureStage::Download,
                    &e,
                );
                self.notify(run, &task.url, ItemStatus::Failed);
            }
        }
    }

    async fn handle_page(&self, run: &mut CrawlRun, task: &CrawlTask, result: FetchResult) {
        if let Some(max_depth) = self.config.max_depth
            && task.depth > max_depth
        {
            debug!(url = %task.url, depth = task.depth, "depth limit reached, not expanding links");
            run.report
                .record_skip(&task.url, SkipReason::DepthLimit { depth: task.depth });
            self.notify(run, &task.url, ItemStatus::Skipped);
            return;
        }

        let base = result.final_url.clone();
        let html = match result.into_text().await {
            Ok(html) => html,
            Err(e) => {
                warn!(url = %task.url, error = %e, "could not read page");
                run.report.record_failure(
                    Some(task.seed),
                    task.url.as_str(),
                    FailureStage::Page,
                    &e,
                );
                self.notify(run, &task.url, ItemStatus::Failed);
                return;
            }
        };

        let links = extract_links(&html, &base);
        let found = links.len();
        let mut likely_pdfs = 0usize;
        let mut enqueued = 0usize;
        for link in links {
            if link.hint == LinkHint::LikelyPdf {
                likely_pdfs += 1;
            }
            if Self::enqueue(run, link.url, task, &base, link.hint) {
                enqueued += 1;
            }
        }

        if likely_pdfs == 0 {
            info!(url = %base, found, enqueued, "no PDF links on page");
        } else {
            info!(url = %base, found, likely_pdfs, enqueued, "scanned page for links");
        }
    }

    fn enqueue(run: &mut CrawlRun, url: Url, parent: &CrawlTask, origin: &Url, hint: LinkHint) -> bool {
        let normalized = normalize_url(&url);
        if !run.visited.mark_enqueued(&normalized) {
            trace!(url = %url, "already seen");
            return false;
        }
        trace!(url = %url, ?hint, depth = parent.depth + 1, "enqueued");
        run.arena.push(
            url,
            normalized,
            parent.depth + 1,
            Some(origin.clone()),
            parent.seed,
            Some(hint),
        );
        true
    }

    fn notify(&self, run: &CrawlRun, url: &Url, status: ItemStatus) {
        self.progress
            .update(run.processed, run.arena.created(), url, status);
    }
}
