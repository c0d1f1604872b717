//! Core data structures shared by the indexing and search subsystems

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Surrogate key of a stored site
pub type SiteId = i64;

/// Surrogate key of a stored page
pub type PageId = i64;

/// Surrogate key of a stored lemma
pub type LemmaId = i64;

/// Maximum length of a site-relative page path
pub const MAX_PATH_LEN: usize = 256;

/// Indexing lifecycle of a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SiteStatus {
    Indexing,
    Indexed,
    Failed,
}

impl SiteStatus {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteStatus::Indexing => "INDEXING",
            SiteStatus::Indexed => "INDEXED",
            SiteStatus::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SiteStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "INDEXING" => SiteStatus::Indexing,
            "INDEXED" => SiteStatus::Indexed,
            _ => SiteStatus::Failed,
        })
    }
}

/// A stored site record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    pub status_time: DateTime<Utc>,
    pub last_error: Option<String>,
}

/// A stored page record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    pub site_id: SiteId,
    pub path: String,
    pub code: u16,
    pub content: String,
}

impl Page {
    /// Pages with a status below 400 carry indexable content
    pub fn is_indexable(&self) -> bool {
        self.code < 400
    }
}

/// A page about to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    pub path: String,
    pub code: u16,
    pub content: String,
}

/// A stored lemma record; `frequency` counts distinct pages of the site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lemma {
    pub id: LemmaId,
    pub site_id: SiteId,
    pub lemma: String,
    pub frequency: u32,
}

/// Weighted link between a page and a lemma
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub page_id: PageId,
    pub lemma_id: LemmaId,
    pub rank: f32,
}

/// A page as returned by the crawler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledPage {
    /// Absolute URL as requested
    pub url: String,

    /// Raw HTML, empty when the fetch failed
    pub content: String,

    /// HTTP status code, 500 for failed fetches
    pub code: u16,
}

impl CrawledPage {
    /// Synthetic record for a URL that could not be fetched
    pub fn failed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content: String::new(),
            code: 500,
        }
    }
}

/// One ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub site: String,
    pub site_name: String,
    pub uri: String,
    pub title: String,
    pub snippet: String,
    pub relevance: f32,
}

/// Paginated search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Number of matching pages before pagination
    pub count: usize,

    /// Requested page of results
    pub data: Vec<SearchResult>,
}

/// Totals across all sites
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalStatistics {
    pub sites: usize,
    pub pages: usize,
    pub lemmas: usize,
    pub indexing: bool,
}

/// Per-site statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedStatistics {
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    pub status_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub pages: usize,
    pub lemmas: usize,
}

/// Statistics report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: TotalStatistics,
    pub detailed: Vec<DetailedStatistics>,
}
