//! Default User-Agent string for crawl and download traffic.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/pdfdl/pdfdl";

/// Default User-Agent for all requests (identifies the tool).
#[must_use]
pub fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("pdfdl/{version} (journal-pdf-crawler; +{PROJECT_UA_URL})")
}
