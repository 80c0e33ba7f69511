//! OJS galley URL shortcuts.
//!
//! OJS serves a galley viewer at `/<journal>/article/view/<submission>/<galley>`
//! and the raw file at the same path with `view` replaced by `download`.
//! Trying the download path first saves fetching and parsing the viewer.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

#[allow(clippy::expect_used)]
static GALLEY_VIEW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>.*/[^/]+/article)/view/(?P<submission>\d+)/(?P<galley>\d+)/?$")
        .expect("galley view regex is valid") // Static pattern, safe to panic
});

/// Returns the galley download URL for an OJS galley view URL.
///
/// Query and fragment are dropped; other URLs return `None`.
#[must_use]
pub fn galley_download_url(url: &Url) -> Option<Url> {
    let captures = GALLEY_VIEW_PATTERN.captures(url.path())?;
    let path = format!(
        "{}/download/{}/{}",
        &captures["prefix"], &captures["submission"], &captures["galley"]
    );
    let mut download = url.clone();
    download.set_path(&path);
    download.set_query(None);
    download.set_fragment(None);
    Some(download)
}
