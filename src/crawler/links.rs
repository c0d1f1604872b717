//! Link discovery and crawl scope
//!
//! A crawl never leaves its site: targets must lie under the configured
//! site URL (with or without `www.`), under the page they were found on,
//! and must not point at binary or office documents.

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Anchors followed by the crawler; navigation in `<head>` is ignored
static BODY_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body a[href]").unwrap());

/// File extensions never fetched (compared lowercase)
pub const BLOCKED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico", "tif", "tiff", "pdf", "doc",
    "docx", "xls", "xlsx", "ppt", "pptx", "odt", "rtf", "zip", "gz", "tar", "rar", "7z", "jar",
    "exe", "mp3", "mp4", "avi", "mov", "webm",
];

/// Redirector links that leave the site through a query parameter
const REDIRECTOR_MARKER: &str = "away.php?to=";

/// URL prefixes that belong to one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteScope {
    prefixes: Vec<String>,
}

impl SiteScope {
    /// Build the scope of a site from its configured URL
    ///
    /// The host is accepted both with and without a leading `www.`.
    pub fn new(site_url: &str) -> Self {
        let site_url = site_url.trim_end_matches('/').to_string();
        let mut prefixes = vec![site_url.clone()];

        if let Some((scheme, rest)) = site_url.split_once("://") {
            let alternate = match rest.strip_prefix("www.") {
                Some(bare) => format!("{scheme}://{bare}"),
                None => format!("{scheme}://www.{rest}"),
            };
            prefixes.push(alternate);
        }

        Self { prefixes }
    }

    /// Check whether `url` lies inside the site
    pub fn contains(&self, url: &str) -> bool {
        self.relative_path(url).is_some()
    }

    /// Path of `url` relative to the site, `/` for the site root
    ///
    /// Returns `None` when `url` is outside the site. A prefix only matches
    /// at a path boundary, so `https://a.com` does not cover `https://a.com.evil`.
    pub fn relative_path(&self, url: &str) -> Option<String> {
        self.prefixes.iter().find_map(|prefix| {
            let rest = url.strip_prefix(prefix.as_str())?;
            if rest.is_empty() {
                Some("/".to_string())
            } else if rest.starts_with('/') {
                Some(rest.to_string())
            } else if rest.starts_with('?') {
                Some(format!("/{rest}"))
            } else {
                None
            }
        })
    }
}

/// Absolute http(s) targets of every anchor inside `<body>`
///
/// Relative references are resolved against `page_url`. Unparseable hrefs
/// are dropped silently.
pub fn extract_links(html: &str, page_url: &str) -> Vec<String> {
    let Ok(base) = Url::parse(page_url) else {
        return Vec::new();
    };

    let document = Html::parse_document(html);
    document
        .select(&BODY_LINK_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .filter(|target| matches!(target.scheme(), "http" | "https"))
        .map(String::from)
        .collect()
}

/// Decide whether a link found on `current` should be crawled
///
/// The visited-set check is left to the caller, which performs it
/// atomically with the insert.
pub fn should_follow(target: &str, current: &str, scope: &SiteScope) -> bool {
    target.starts_with(current)
        && target != current
        && !target.contains('#')
        && !target.contains(REDIRECTOR_MARKER)
        && scope.contains(target)
        && !has_blocked_extension(target)
}

/// Check the last dot-segment of the URL path against [`BLOCKED_EXTENSIONS`]
pub fn has_blocked_extension(url: &str) -> bool {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };

    let last_segment = path.rsplit('/').next().unwrap_or("");
    match last_segment.rsplit_once('.') {
        Some((_, extension)) => {
            let extension = extension.to_ascii_lowercase();
            BLOCKED_EXTENSIONS.contains(&extension.as_str())
        }
        None => false,
    }
}
