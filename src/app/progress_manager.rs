//! Progress bar for crawl runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use url::Url;

use pdfdl_core::{ItemStatus, Progress, ResourceKind};

/// Terminal progress display backed by an indicatif bar on stderr.
///
/// The bar length follows the engine's growing task estimate.
pub(crate) struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub(crate) fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl Progress for BarProgress {
    fn update(&self, current: usize, total_estimate: usize, url: &Url, status: ItemStatus) {
        self.bar.set_length(to_u64(total_estimate));
        self.bar.set_position(to_u64(current));
        self.bar.set_message(status_message(url, status));
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn status_message(url: &Url, status: ItemStatus) -> String {
    let host = url.host_str().unwrap_or("?");
    match status {
        ItemStatus::Fetching => format!("Fetching {host}{}", url.path()),
        ItemStatus::Classified(ResourceKind::DirectPdf) => format!("Downloading from {host}..."),
        ItemStatus::Classified(ResourceKind::HtmlPage) => format!("Scanning {host}{}", url.path()),
        ItemStatus::Classified(kind) => format!("{kind}: {host}{}", url.path()),
        ItemStatus::Downloaded => format!("Saved PDF from {host}"),
        ItemStatus::Skipped => format!("Skipped {host}{}", url.path()),
        ItemStatus::Failed => format!("Failed {host}{}", url.path()),
    }
}
