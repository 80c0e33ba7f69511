//! Link discovery in HTML pages.
//!
//! [`extract_links`] is pure: the same HTML and base URL always yield the
//! same ordered list. Rules are applied per anchor, first match wins:
//!
//! 1. empty, fragment-only or non-http(s) hrefs are dropped;
//! 2. anchors marked as PDF viewer/download links (class `pdf` or `download`,
//!    or a `download` attribute) are [`LinkHint::LikelyPdf`];
//! 3. hrefs whose path ends in `.pdf` are [`LinkHint::LikelyPdf`];
//! 4. other same-host links are [`LinkHint::LikelyPage`];
//! 5. links to other hosts are dropped.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::trace;
use url::Url;

use crate::classify::path_has_pdf_extension;
use crate::crawl::normalize_url;

/// Class names OJS themes put on galley and download anchors.
const PDF_MARKER_CLASSES: &[&str] = &["pdf", "download"];

#[allow(clippy::expect_used)]
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector is valid")); // Static pattern, safe to panic

#[allow(clippy::expect_used)]
static BASE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("base[href]").expect("base selector is valid")); // Static pattern, safe to panic

/// What an extracted link probably points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkHint {
    /// A galley/download anchor or a `.pdf` href.
    LikelyPdf,
    /// A same-host page worth traversing (issue, article, pagination).
    LikelyPage,
}

/// An absolute link found on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    /// Absolute URL, fragment removed.
    pub url: Url,
    /// Type hint from the anchor.
    pub hint: LinkHint,
}

/// Extracts candidate links from `html`, resolved against `base_url`.
///
/// A valid `<base href>` in the document overrides `base_url` for resolution;
/// the same-host rule still compares against `base_url`.
#[must_use]
pub fn extract_links(html: &str, base_url: &Url) -> Vec<ExtractedLink> {
    let document = Html::parse_document(html);
    let resolve_base = document_base(&document, base_url);

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_href(&resolve_base, href) else {
            trace!(href, "discarding non-navigable href");
            continue;
        };
        let Some(hint) = hint_for(&anchor, &url, base_url) else {
            trace!(url = %url, "discarding off-host link");
            continue;
        };
        if seen.insert(normalize_url(&url)) {
            links.push(ExtractedLink { url, hint });
        }
    }

    links
}

fn document_base(document: &Html, page_url: &Url) -> Url {
    document
        .select(&BASE_SELECTOR)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .filter(is_http)
        .unwrap_or_else(|| page_url.clone())
}

fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let mut url = base.join(href).ok()?;
    if !is_http(&url) {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

fn hint_for(anchor: &ElementRef<'_>, url: &Url, base_url: &Url) -> Option<LinkHint> {
    if has_pdf_marker(anchor) || path_has_pdf_extension(url.path()) {
        return Some(LinkHint::LikelyPdf);
    }
    (url.host_str() == base_url.host_str()).then_some(LinkHint::LikelyPage)
}

fn has_pdf_marker(anchor: &ElementRef<'_>) -> bool {
    let element = anchor.value();
    element.attr("download").is_some()
        || element
            .classes()
            .any(|class| PDF_MARKER_CLASSES.iter().any(|m| class.eq_ignore_ascii_case(m)))
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
