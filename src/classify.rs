//! Response classification: PDF, HTML page, unresolved redirect, or unsupported.

use std::fmt;

use serde::Serialize;

use crate::fetch::FetchResult;

/// What a fetched resource turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// The response body is the PDF itself.
    DirectPdf,
    /// An HTML page to scan for further links.
    HtmlPage,
    /// A 3xx the fetcher could not follow (no usable `Location`).
    Redirect,
    /// Anything else; skipped.
    Unsupported,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DirectPdf => "pdf",
            Self::HtmlPage => "html",
            Self::Redirect => "redirect",
            Self::Unsupported => "unsupported",
        };
        f.write_str(label)
    }
}

/// Classifies a fetched response. Total over all inputs; never fails.
#[must_use]
pub fn classify(result: &FetchResult) -> ResourceKind {
    let mime = result.content_type().map(normalized_mime).unwrap_or_default();

    if result.status.is_redirection() {
        return ResourceKind::Redirect;
    }

    if mime.starts_with("application/pdf")
        || (result.status.is_success() && path_has_pdf_extension(result.final_url.path()))
    {
        return ResourceKind::DirectPdf;
    }

    if mime == "text/html" || mime == "application/xhtml+xml" {
        return ResourceKind::HtmlPage;
    }

    ResourceKind::Unsupported
}

/// Returns true if a URL path ends in `.pdf` (case-insensitive).
#[must_use]
pub fn path_has_pdf_extension(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".pdf")
}

fn normalized_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reqwest::StatusCode;
    use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
    use url::Url;

    fn response(status: u16, content_type: Option<&'static str>, url: &str) -> FetchResult {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        FetchResult::from_bytes(
            StatusCode::from_u16(status).unwrap(),
            headers,
            Url::parse(url).unwrap(),
            Bytes::new(),
        )
    }

    #[test]
    fn test_classify_pdf_content_type() {
        let r = response(200, Some("application/pdf"), "https://j.example/download/1/2");
        assert_eq!(classify(&r), ResourceKind::DirectPdf);
    }

    #[test]
    fn test_classify_pdf_content_type_with_parameters_and_case() {
        let r = response(200, Some("Application/PDF; charset=binary"), "https://j.example/x");
        assert_eq!(classify(&r), ResourceKind::DirectPdf);
    }

    #[test]
    fn test_classify_pdf_extension_with_octet_stream() {
        let r = response(
            200,
            Some("application/octet-stream"),
            "https://j.example/files/Paper.PDF",
        );
        assert_eq!(classify(&r), ResourceKind::DirectPdf);
    }

    #[test]
    fn test_classify_pdf_extension_outranks_html_content_type() {
        let r = response(200, Some("text/html"), "https://j.example/files/paper.pdf");
        assert_eq!(classify(&r), ResourceKind::DirectPdf);
    }

    #[test]
    fn test_classify_html_page() {
        let r = response(
            200,
            Some("text/html; charset=utf-8"),
            "https://j.example/index.php/j/issue/view/4",
        );
        assert_eq!(classify(&r), ResourceKind::HtmlPage);
    }

    #[test]
    fn test_classify_xhtml_page() {
        let r = response(200, Some("application/xhtml+xml"), "https://j.example/a");
        assert_eq!(classify(&r), ResourceKind::HtmlPage);
    }

    #[test]
    fn test_classify_unresolved_redirect() {
        let r = response(302, Some("text/html"), "https://j.example/article/download/1/2.pdf");
        assert_eq!(classify(&r), ResourceKind::Redirect);
    }

    #[test]
    fn test_classify_unsupported_content() {
        let r = response(200, Some("image/png"), "https://j.example/cover.png");
        assert_eq!(classify(&r), ResourceKind::Unsupported);
    }

    #[test]
    fn test_classify_missing_content_type_is_unsupported() {
        let r = response(200, None, "https://j.example/article/view/5");
        assert_eq!(classify(&r), ResourceKind::Unsupported);
    }

    #[test]
    fn test_classify_is_total_over_statuses() {
        for status in [100, 200, 204, 301, 304, 404, 500] {
            for ct in [None, Some("text/html"), Some("application/pdf"), Some("")] {
                let _ = classify(&response(status, ct, "https://j.example/p"));
            }
        }
    }

    #[test]
    fn test_resource_kind_display() {
        assert_eq!(ResourceKind::DirectPdf.to_string(), "pdf");
        assert_eq!(ResourceKind::Unsupported.to_string(), "unsupported");
    }
}
