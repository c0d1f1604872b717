//! Ranked full-text search over indexed sites
//!
//! A query is reduced to lemmas, candidate pages must contain every one of
//! them, and relevance is the sum of the pages' index ranks normalized so
//! that the best page scores 1.0.
//!
//! ```no_run
//! use std::sync::Arc;
//! use sitesearch::lemma::Lemmatizer;
//! use sitesearch::search::SearchEngine;
//! use sitesearch::storage::create_memory_repository;
//!
//! let engine = SearchEngine::new(create_memory_repository(), Arc::new(Lemmatizer::new()));
//! let response = engine.search("cats and dogs", None, 0, 30)?;
//! println!("{} pages match", response.count);
//! # Ok::<(), sitesearch::error::SearchError>(())
//! ```

pub mod snippet;

pub use snippet::{build_snippet, DEFAULT_FRAGMENTS};

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::error::SearchError;
use crate::lemma::Lemmatizer;
use crate::models::{
    LemmaId, PageId, SearchResponse, SearchResult, Site, SiteId, SiteStatus,
};
use crate::parser::{truncate_chars, PageZones};
use crate::storage::SharedIndexRepository;

/// Longest title returned in a search result, in characters
pub const TITLE_MAX_CHARS: usize = 300;

/// Query evaluation over the stored index
pub struct SearchEngine {
    repo: SharedIndexRepository,
    lemmatizer: Arc<Lemmatizer>,
    snippet_fragments: usize,
}

impl SearchEngine {
    pub fn new(repo: SharedIndexRepository, lemmatizer: Arc<Lemmatizer>) -> Self {
        Self {
            repo,
            lemmatizer,
            snippet_fragments: DEFAULT_FRAGMENTS,
        }
    }

    /// Set the maximum number of snippet fragments per result
    #[must_use]
    pub fn with_snippet_fragments(mut self, fragments: usize) -> Self {
        self.snippet_fragments = fragments;
        self
    }

    /// Search `query` within `site`, or within every indexed site
    ///
    /// `count` in the response is the number of matching pages before
    /// pagination. An `offset` at or beyond it yields no data.
    ///
    /// # Errors
    ///
    /// - `SearchError::UnknownSite` if `site` is non-empty and not stored
    /// - `SearchError::Lemma` if the query cannot be lemmatized
    /// - `SearchError::Storage` on repository failures
    pub fn search(
        &self,
        query: &str,
        site: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<SearchResponse, SearchError> {
        let sites = self.sites_in_scope(site)?;
        let query_lemmas = self.lemmatizer.lemma_sequence(query)?;
        if query_lemmas.is_empty() || sites.is_empty() {
            return Ok(SearchResponse::default());
        }

        let site_ids: Vec<SiteId> = sites.keys().copied().collect();
        let Some(ranked) = self.rank(&query_lemmas, &site_ids)? else {
            return Ok(SearchResponse::default());
        };

        let count = ranked.len();
        let window: Vec<(PageId, f32)> = ranked.into_iter().skip(offset).take(limit).collect();
        tracing::debug!(query, count, returned = window.len(), "Search evaluated");

        let lemma_set: HashSet<String> = query_lemmas.into_iter().collect();
        let data = self.build_results(&window, &sites, &lemma_set)?;
        Ok(SearchResponse { count, data })
    }

    /// Stored sites the search runs over, keyed by id
    fn sites_in_scope(&self, site: Option<&str>) -> Result<BTreeMap<SiteId, Site>, SearchError> {
        let url = site
            .map(|s| s.trim().trim_end_matches('/'))
            .filter(|s| !s.is_empty());

        let sites = match url {
            Some(url) => {
                let found = self
                    .repo
                    .find_site(url)?
                    .ok_or_else(|| SearchError::UnknownSite(url.to_string()))?;
                vec![found]
            }
            None => self.repo.all_sites()?,
        };

        Ok(sites
            .into_iter()
            .filter(|s| s.status == SiteStatus::Indexed)
            .map(|s| (s.id, s))
            .collect())
    }

    /// Candidate pages with normalized relevance, best first
    ///
    /// `None` when some query lemma matches nothing or no page contains
    /// all of them.
    fn rank(
        &self,
        query_lemmas: &[String],
        site_ids: &[SiteId],
    ) -> Result<Option<Vec<(PageId, f32)>>, SearchError> {
        let distinct: Vec<String> = {
            let mut seen = HashSet::new();
            query_lemmas
                .iter()
                .filter(|l| seen.insert(l.as_str()))
                .cloned()
                .collect()
        };

        let rows = self.repo.find_lemmas(&distinct, site_ids)?;
        let mut by_text: HashMap<&str, (u64, Vec<LemmaId>)> = HashMap::new();
        for row in &rows {
            let group = by_text.entry(row.lemma.as_str()).or_default();
            group.0 += u64::from(row.frequency);
            group.1.push(row.id);
        }

        let mut filters = Vec::with_capacity(query_lemmas.len());
        for lemma in query_lemmas {
            match by_text.get(lemma.as_str()) {
                Some(group) => filters.push(group),
                None => return Ok(None),
            }
        }
        filters.sort_by_key(|(frequency, _)| *frequency);

        let mut candidates: Option<HashSet<PageId>> = None;
        for (_, lemma_ids) in filters {
            let pages = self.repo.pages_with_lemmas(lemma_ids)?;
            let narrowed = match candidates {
                None => pages,
                Some(current) => current.intersection(&pages).copied().collect(),
            };
            if narrowed.is_empty() {
                return Ok(None);
            }
            candidates = Some(narrowed);
        }
        let Some(candidates) = candidates else {
            return Ok(None);
        };

        let page_ids: Vec<PageId> = candidates.into_iter().collect();
        let lemma_ids: Vec<LemmaId> = rows.iter().map(|r| r.id).collect();

        let mut absolute: HashMap<PageId, f32> = HashMap::new();
        let mut counted = HashSet::new();
        for entry in self.repo.index_entries(&page_ids, &lemma_ids)? {
            if counted.insert((entry.page_id, entry.lemma_id)) {
                *absolute.entry(entry.page_id).or_default() += entry.rank;
            }
        }

        let max = absolute.values().copied().fold(0.0_f32, f32::max);
        if max <= 0.0 {
            return Ok(None);
        }

        let mut ranked: Vec<(PageId, f32)> = absolute
            .into_iter()
            .map(|(page, rank)| (page, rank / max))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        Ok(Some(ranked))
    }

    fn build_results(
        &self,
        window: &[(PageId, f32)],
        sites: &BTreeMap<SiteId, Site>,
        lemmas: &HashSet<String>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let ids: Vec<PageId> = window.iter().map(|(id, _)| *id).collect();
        let pages: HashMap<PageId, _> = self
            .repo
            .pages_by_ids(&ids)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut results = Vec::with_capacity(window.len());
        for (id, relevance) in window {
            let Some(page) = pages.get(id) else {
                continue;
            };
            let Some(site) = sites.get(&page.site_id) else {
                continue;
            };

            let zones = PageZones::parse(&page.content);
            let snippet = snippet::build_snippet(
                &self.lemmatizer,
                &zones.full_text(),
                lemmas,
                self.snippet_fragments,
            )?;

            results.push(SearchResult {
                site: site.url.clone(),
                site_name: site.name.clone(),
                uri: page.path.clone(),
                title: truncate_chars(&zones.title, TITLE_MAX_CHARS),
                snippet,
                relevance: *relevance,
            });
        }
        Ok(results)
    }
}
