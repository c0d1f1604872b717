//! Indexing pipeline for one site
//!
//! ```text
//! NONE ──▶ INDEXING ──┬──▶ INDEXED
//!                     └──▶ FAILED (last_error)
//! ```
//!
//! The steps run strictly in order: crawl and store pages, build the lemma
//! table, rank pages and store index entries, mark the site INDEXED.
//! Cancellation is checked before the crawl, before the lemma table is
//! saved and before the index is saved. Whatever stops the build, the
//! site ends FAILED and its partial lemma table and index are removed.

use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::ranker::{self, PageLemmas};
use crate::config::{Config, SiteConfig};
use crate::crawler::{PageFetcher, SiteCrawler, SiteScope};
use crate::error::IndexingError;
use crate::lemma::Lemmatizer;
use crate::models::{CrawledPage, NewPage, Site, SiteStatus, MAX_PATH_LEN};
use crate::storage::SharedIndexRepository;

/// Counts of rows written by a successful build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub pages: usize,
    pub lemmas: usize,
    pub entries: usize,
}

/// Builds the index of one site at a time
pub struct SiteIndexer {
    config: Arc<Config>,
    repo: SharedIndexRepository,
    lemmatizer: Arc<Lemmatizer>,
    fetcher: Arc<PageFetcher>,
    cancel: CancellationToken,
}

impl SiteIndexer {
    pub fn new(
        config: Arc<Config>,
        repo: SharedIndexRepository,
        lemmatizer: Arc<Lemmatizer>,
        fetcher: Arc<PageFetcher>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            repo,
            lemmatizer,
            fetcher,
            cancel,
        }
    }

    /// Re-index `site` from scratch and return its final status
    ///
    /// Build failures, cancellation included, are recorded on the site
    /// record and reported as `Ok(SiteStatus::Failed)`.
    ///
    /// # Errors
    ///
    /// Returns `IndexingError::Storage` only if the site record itself
    /// cannot be created or its final status cannot be written.
    pub async fn index_site(&self, site: &SiteConfig) -> Result<SiteStatus, IndexingError> {
        let record = self.begin(site)?;
        tracing::info!(site = %record.url, name = %record.name, "Indexing started");

        match self.build(&record).await {
            Ok(summary) => {
                self.repo
                    .update_site_status(record.id, SiteStatus::Indexed, None)?;
                tracing::info!(
                    site = %record.url,
                    pages = summary.pages,
                    lemmas = summary.lemmas,
                    entries = summary.entries,
                    "Site indexed"
                );
                Ok(SiteStatus::Indexed)
            }
            Err(e) => {
                if e.is_cancelled() {
                    tracing::warn!(site = %record.url, "Indexing interrupted");
                } else {
                    tracing::error!(site = %record.url, error = %e, "Indexing failed");
                }

                if let Err(clear_err) = self.repo.clear_site_index(record.id) {
                    tracing::error!(site = %record.url, error = %clear_err, "Failed to clear partial index");
                }
                self.repo
                    .update_site_status(record.id, SiteStatus::Failed, Some(&e.to_string()))?;
                Ok(SiteStatus::Failed)
            }
        }
    }

    /// Drop any previous record of the site and create a fresh INDEXING one
    fn begin(&self, site: &SiteConfig) -> Result<Site, IndexingError> {
        while let Some(previous) = self.repo.find_site(&site.url)? {
            tracing::debug!(site = %site.url, id = previous.id, "Removing previous index");
            self.repo.delete_site(previous.id)?;
        }
        Ok(self
            .repo
            .create_site(&site.url, &site.name, SiteStatus::Indexing)?)
    }

    async fn build(&self, site: &Site) -> Result<BuildSummary, IndexingError> {
        self.checkpoint()?;

        let crawler = SiteCrawler::from_config(
            &self.config,
            Arc::clone(&self.fetcher),
            &site.url,
            self.cancel.clone(),
        );
        let crawled = crawler.crawl(&format!("{}/", site.url)).await?;

        let pages = to_new_pages(&SiteScope::new(&site.url), crawled);
        let ids = self.repo.save_pages(site.id, &pages)?;

        let indexable: Vec<(i64, String)> = ids
            .into_iter()
            .zip(pages.iter())
            .filter(|(_, page)| page.code < 400)
            .map(|(id, page)| (id, page.content.clone()))
            .collect();

        let lemmatizer = Arc::clone(&self.lemmatizer);
        let analyzed: Vec<PageLemmas> = tokio::task::spawn_blocking(move || {
            indexable
                .iter()
                .map(|(id, html)| ranker::analyze_page(&lemmatizer, *id, html))
                .collect::<Result<Vec<_>, _>>()
        })
        .await??;

        let table: Vec<(String, u32)> = ranker::build_lemma_table(&analyzed).into_iter().collect();

        self.checkpoint()?;
        let lemmas = self.repo.save_lemmas(site.id, &table)?;

        let entries = ranker::rank_pages(&analyzed, &lemmas);

        self.checkpoint()?;
        self.repo.save_index(&entries)?;

        Ok(BuildSummary {
            pages: pages.len(),
            lemmas: lemmas.len(),
            entries: entries.len(),
        })
    }

    fn checkpoint(&self) -> Result<(), IndexingError> {
        if self.cancel.is_cancelled() {
            Err(IndexingError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Convert crawl results into site-relative page records
///
/// Pages whose path exceeds [`MAX_PATH_LEN`] or repeats an earlier path
/// (the same page reached with and without `www.`) are dropped.
fn to_new_pages(scope: &SiteScope, crawled: Vec<CrawledPage>) -> Vec<NewPage> {
    let mut seen = HashSet::new();
    let mut pages = Vec::with_capacity(crawled.len());

    for page in crawled {
        let Some(path) = scope.relative_path(&page.url) else {
            tracing::debug!(url = %page.url, "Crawled URL outside site, skipped");
            continue;
        };
        if path.chars().count() > MAX_PATH_LEN {
            tracing::warn!(url = %page.url, "Page path too long, skipped");
            continue;
        }
        if !seen.insert(path.clone()) {
            continue;
        }
        pages.push(NewPage {
            path,
            code: page.code,
            content: page.content,
        });
    }

    pages
}
