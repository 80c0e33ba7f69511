//! URL normalization and the visited set.

use std::collections::HashSet;

use url::Url;

/// Normalizes a URL for deduplication.
///
/// The `url` crate already lowercases scheme and host, drops default ports
/// and gives empty paths a `/`; on top of that the fragment is removed.
#[must_use]
pub fn normalize_url(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized.into()
}

/// Normalized URLs already enqueued, and the subset actually fetched.
///
/// `enqueued` guarantees a URL enters the queue at most once. `fetched`
/// also records post-redirect URLs, so two tasks landing on the same final
/// resource are processed once.
#[derive(Debug, Default)]
pub struct VisitedSet {
    enqueued: HashSet<String>,
    fetched: HashSet<String>,
}

impl VisitedSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as enqueued. Returns false if it was already seen.
    pub fn mark_enqueued(&mut self, normalized: &str) -> bool {
        self.enqueued.insert(normalized.to_string())
    }

    /// Marks a URL as fetched (and enqueued). Returns false if it was
    /// already fetched.
    pub fn mark_fetched(&mut self, normalized: &str) -> bool {
        self.enqueued.insert(normalized.to_string());
        self.fetched.insert(normalized.to_string())
    }

    /// True if the URL was fetched.
    #[must_use]
    pub fn was_fetched(&self, normalized: &str) -> bool {
        self.fetched.contains(normalized)
    }
}
