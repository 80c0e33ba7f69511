//! Filename derivation, sanitization, and run-unique destination paths.
//!
//! Precedence for the base name:
//! 1. `Content-Disposition` filename (`filename*=` before `filename=`)
//! 2. last path segment of the final URL, when it ends in `.pdf`
//! 3. `document-<hash>.pdf`, hashed from the final URL
//!
//! The [`FilenameResolver`] then makes the name unique within the run and,
//! unless overwriting, against files already in the output directory.

use std::collections::HashSet;
use std::path::PathBuf;

use reqwest::header::CONTENT_DISPOSITION;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::classify::path_has_pdf_extension;
use crate::fetch::FetchResult;

/// Upper bound on numeric suffixes tried before giving up.
const MAX_SUFFIX: usize = 10_000;

/// Longest filename (in bytes) produced by sanitization.
const MAX_FILENAME_BYTES: usize = 200;

/// Hex characters of the URL hash used in fallback names.
const FALLBACK_HASH_LEN: usize = 12;

/// Errors from filename resolution.
#[derive(Debug, Error)]
pub enum FilenameError {
    /// Every numeric suffix up to the limit was already taken.
    #[error("could not find a free filename for {base} in {dir} after {attempts} attempts")]
    CollisionUnresolved {
        /// The base filename that kept colliding.
        base: String,
        /// The output directory.
        dir: PathBuf,
        /// Number of suffixes tried.
        attempts: usize,
    },
}

/// Where a name came from, for logs and the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    /// `Content-Disposition` header.
    ContentDisposition,
    /// Final URL path segment.
    UrlPath,
    /// Hash of the final URL.
    Fallback,
}

/// A resolved, run-unique destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    /// Filename within the output directory.
    pub filename: String,
    /// Full destination path.
    pub path: PathBuf,
    /// Which rule produced the base name.
    pub source: NameSource,
}

/// Hands out unique destination paths for one run.
#[derive(Debug)]
pub struct FilenameResolver {
    output_dir: PathBuf,
    overwrite: bool,
    taken: HashSet<String>,
}

impl FilenameResolver {
    /// Creates a resolver writing into `output_dir`.
    ///
    /// With `overwrite`, files already on disk may be replaced; names are
    /// still unique within the run.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            overwrite,
            taken: HashSet::new(),
        }
    }

    /// Derives the filename for a PDF response and reserves it.
    ///
    /// # Errors
    ///
    /// Returns [`FilenameError::CollisionUnresolved`] if no free suffix exists.
    pub fn resolve(&mut self, result: &FetchResult) -> Result<ResolvedName, FilenameError> {
        let (base, source) = base_filename(result);
        let filename = self.reserve(&base)?;
        debug!(filename = %filename, source = ?source, "resolved filename");
        Ok(ResolvedName {
            path: self.output_dir.join(&filename),
            filename,
            source,
        })
    }

    fn reserve(&mut self, base: &str) -> Result<String, FilenameError> {
        if self.is_free(base) {
            self.taken.insert(base.to_string());
            return Ok(base.to_string());
        }

        let (stem, ext) = split_extension(base);
        for i in 1..=MAX_SUFFIX {
            let candidate = format!("{stem}-{i}{ext}");
            if self.is_free(&candidate) {
                self.taken.insert(candidate.clone());
                return Ok(candidate);
            }
        }

        Err(FilenameError::CollisionUnresolved {
            base: base.to_string(),
            dir: self.output_dir.clone(),
            attempts: MAX_SUFFIX,
        })
    }

    fn is_free(&self, name: &str) -> bool {
        !self.taken.contains(name) && (self.overwrite || !self.output_dir.join(name).exists())
    }
}

/// Picks the base filename by precedence, before uniqueness is applied.
#[must_use]
pub fn base_filename(result: &FetchResult) -> (String, NameSource) {
    let from_header = result
        .headers
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_disposition)
        .map(|name| sanitize_filename(&name))
        .filter(|name| !name.is_empty());
    if let Some(name) = from_header {
        return (name, NameSource::ContentDisposition);
    }

    if let Some(name) = filename_from_url(&result.final_url) {
        return (name, NameSource::UrlPath);
    }

    (fallback_filename(&result.final_url), NameSource::Fallback)
}

/// Last path segment of `url`, decoded and sanitized, when it names a PDF.
pub(crate) fn filename_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    if !path_has_pdf_extension(last) {
        return None;
    }
    let decoded = urlencoding::decode(last).map_or_else(|_| last.to_string(), |d| d.into_owned());
    let name = sanitize_filename(&decoded);
    (!name.is_empty() && path_has_pdf_extension(&name)).then_some(name)
}

/// `document-<sha256 prefix>.pdf`, stable for a given URL.
pub(crate) fn fallback_filename(url: &Url) -> String {
    let digest = Sha256::digest(url.as_str().as_bytes());
    let hex: String = digest
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<String>()
        .chars()
        .take(FALLBACK_HASH_LEN)
        .collect();
    format!("document-{hex}.pdf")
}

/// Parses Content-Disposition header to extract a percent-decoded filename.
///
/// Handles:
/// - `attachment; filename="example.pdf"`
/// - `attachment; filename=example.pdf`
/// - `attachment; filename*=UTF-8''example%20file.pdf` (RFC 5987)
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    let lower = header.to_ascii_lowercase();

    // filename*= wins when present
    if let Some(pos) = lower.find("filename*=") {
        let value = header[pos + 10..].trim();
        let end = value.find(';').unwrap_or(value.len());
        let value = value[..end].trim().trim_matches('"');
        // charset'language'encoded_value
        let encoded = value.find("''").map_or(value, |q| &value[q + 2..]);
        if let Ok(decoded) = urlencoding::decode(encoded)
            && !decoded.trim().is_empty()
        {
            return Some(decoded.into_owned());
        }
    }

    let pos = lower.find("filename=")?;
    let value = header[pos + 9..].trim();
    let raw = if let Some(stripped) = value.strip_prefix('"') {
        let end = stripped.find('"').unwrap_or(stripped.len());
        &stripped[..end]
    } else {
        let end = value.find(';').unwrap_or(value.len());
        value[..end].trim().trim_matches('\'')
    };
    if raw.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |d| d.into_owned());
    Some(decoded)
}

/// Sanitizes a filename for filesystem safety.
///
/// Replaces path separators, `: * ? " < > |` and control characters with
/// `_`, collapses `..` runs, trims leading dots and whitespace, and caps the
/// length. May return an empty string.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let mut sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", ".");
    }

    let trimmed = sanitized
        .trim_start_matches(|c: char| c == '.' || c.is_whitespace())
        .trim_end();
    truncate_preserving_extension(trimmed, MAX_FILENAME_BYTES)
}

fn truncate_preserving_extension(name: &str, max_bytes: usize) -> String {
    if name.len() <= max_bytes {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    if ext.len() >= max_bytes {
        return truncate_at_char_boundary(name, max_bytes).to_string();
    }
    let stem_room = max_bytes.saturating_sub(ext.len());
    let mut end = stem_room.min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{ext}", &stem[..end])
}

fn truncate_at_char_boundary(name: &str, max_bytes: usize) -> &str {
    let mut end = max_bytes.min(name.len());
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    }
}
