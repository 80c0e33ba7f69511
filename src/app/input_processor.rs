//! Assembly of seed URLs from positional arguments and an input file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::Args;

/// Returns seeds from the command line followed by those in `--input-file`.
///
/// Blank lines and lines starting with `#` are ignored. Seeds are trimmed but
/// otherwise passed through; the traversal engine validates and deduplicates.
pub(crate) fn collect_seeds(args: &Args) -> Result<Vec<String>> {
    let mut seeds: Vec<String> = args
        .urls
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(path) = args.input_file.as_deref() {
        let from_file = read_input_file(path)?;
        debug!(path = %path.display(), seeds = from_file.len(), "read input file");
        seeds.extend(from_file);
    }

    Ok(seeds)
}

fn read_input_file(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file '{}'", path.display()))?;
    Ok(parse_seed_lines(&raw))
}

fn parse_seed_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
