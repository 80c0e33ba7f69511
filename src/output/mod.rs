//! CLI output formatting and display helpers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use pdfdl_core::RunReport;

/// Message when no seed URL was given at all.
pub const NO_INPUT_GUIDANCE: &str = "No seed URLs provided. Pass URLs as arguments or use --input-file.";

/// Example for passing URLs as arguments.
pub const INPUT_ARG_EXAMPLE: &str =
    "Example: pdfdl https://journal.example/index.php/jrn/issue/view/12";

/// Example for reading seeds from a file.
pub const INPUT_FILE_EXAMPLE: &str = "Example: pdfdl -i seeds.txt -o ./pdfs";

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

/// Prints the no-input hint to stderr.
pub fn print_usage_hint() {
    let width = terminal_width().min(80);
    for line in [NO_INPUT_GUIDANCE, INPUT_ARG_EXAMPLE, INPUT_FILE_EXAMPLE] {
        eprintln!("{}", truncate_to_width(line, width));
    }
}

/// Logs and prints the end-of-run summary.
pub(crate) fn print_completion_summary(report: &RunReport, output_dir: &Path, dry_run: bool) {
    info!(
        downloaded = report.downloads.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        pages_fetched = report.pages_fetched,
        output_dir = %output_dir.display(),
        "Crawl Summary"
    );
    for line in render_summary_lines(report, output_dir, dry_run, terminal_width()) {
        println!("{line}");
    }
}

pub(crate) fn render_summary_lines(
    report: &RunReport,
    output_dir: &Path,
    dry_run: bool,
    width: usize,
) -> Vec<String> {
    let downloaded = report.downloads.len();
    let headline = if dry_run {
        format!("Dry run: {downloaded} PDF(s) would be saved to {}", output_dir.display())
    } else {
        format!("Downloaded {downloaded} PDF(s) to {}", output_dir.display())
    };

    let mut lines = vec![
        truncate_to_width(&headline, width),
        format!("Skipped: {}", report.skipped.len()),
        format!("Failed: {}", report.failed.len()),
    ];
    for failure in &report.failed {
        let line = format!("  {} ({:?}): {}", failure.url, failure.stage, failure.error);
        lines.push(truncate_to_width(&line, width));
    }
    lines
}

/// Writes the run report as pretty JSON.
pub(crate) fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let json = report
        .to_json()
        .context("Failed to serialize run report")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write run report '{}'", path.display()))?;
    info!(path = %path.display(), "Wrote run report");
    Ok(())
}
