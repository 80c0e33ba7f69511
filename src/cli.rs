//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use pdfdl_core::fetch::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS};

/// Crawl Open Journal Systems sites and download their PDF galleys.
///
/// Give journal, issue or article URLs (or direct PDF links); pdfdl follows
/// links breadth-first and saves every PDF it finds.
#[derive(Parser, Debug, Clone)]
#[command(name = "pdfdl")]
#[command(author, version, about)]
pub struct Args {
    /// Seed URLs to start crawling from
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Read additional seed URLs from a file (one per line, # comments allowed)
    #[arg(short = 'i', long, value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// Directory to save PDFs into (created if missing)
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Overwrite files that already exist in the output directory
    #[arg(long)]
    pub overwrite: bool,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "STRING")]
    pub user_agent: Option<String>,

    /// Stop following links on pages deeper than N (seeds are depth 0)
    #[arg(long, value_name = "N")]
    pub max_depth: Option<u32>,

    /// Do not rewrite OJS galley viewer URLs to their download URLs
    #[arg(long)]
    pub no_ojs_shortcut: bool,

    /// Crawl and resolve filenames without writing any PDFs
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON run report to PATH
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Connect timeout in seconds (1-3600)
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: u64,

    /// Whole-request timeout in seconds (1-3600)
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
