//! Index persistence
//!
//! The indexing pipeline, the search engine and the indexing service talk
//! to storage only through [`IndexRepository`]. Two backends exist:
//!
//! ```text
//!        SiteIndexer / SearchEngine / IndexingService
//!                          │
//!                          ▼
//!                   IndexRepository
//!                ┌─────────┴─────────┐
//!                ▼                   ▼
//!   SqliteIndexRepository   MemoryIndexRepository
//! ```
//!
//! Deleting a site removes its pages, lemmas and index entries.

pub mod memory;
pub mod sqlite;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::models::{
    IndexEntry, Lemma, LemmaId, NewPage, Page, PageId, Site, SiteId, SiteStatus,
};

pub use memory::MemoryIndexRepository;
pub use sqlite::SqliteIndexRepository;

/// Storage contract of the indexer and the search engine
pub trait IndexRepository: Send + Sync {
    // ---- sites ----

    /// Find a site by its canonical URL
    fn find_site(&self, url: &str) -> Result<Option<Site>>;

    /// All stored sites, ordered by id
    fn all_sites(&self) -> Result<Vec<Site>>;

    /// Insert a new site record with the current time as status time
    fn create_site(&self, url: &str, name: &str, status: SiteStatus) -> Result<Site>;

    /// Change a site's status, stamping the current time
    ///
    /// `last_error` replaces the stored error, `None` clears it.
    fn update_site_status(
        &self,
        site_id: SiteId,
        status: SiteStatus,
        last_error: Option<&str>,
    ) -> Result<()>;

    /// Delete a site together with its pages, lemmas and index entries
    fn delete_site(&self, site_id: SiteId) -> Result<()>;

    /// Whether any stored site is in the INDEXING state
    fn any_site_indexing(&self) -> Result<bool> {
        Ok(self
            .all_sites()?
            .iter()
            .any(|site| site.status == SiteStatus::Indexing))
    }

    // ---- pages ----

    /// Insert pages of a site, returning their ids in input order
    fn save_pages(&self, site_id: SiteId, pages: &[NewPage]) -> Result<Vec<PageId>>;

    /// All pages of a site, ordered by id
    fn pages_of_site(&self, site_id: SiteId) -> Result<Vec<Page>>;

    /// Pages with the given ids; unknown ids are skipped
    fn pages_by_ids(&self, ids: &[PageId]) -> Result<Vec<Page>>;

    /// Number of pages stored for a site
    fn count_pages(&self, site_id: SiteId) -> Result<usize>;

    // ---- lemmas ----

    /// Insert the lemma table of a site
    fn save_lemmas(&self, site_id: SiteId, lemmas: &[(String, u32)]) -> Result<Vec<Lemma>>;

    /// Lemma table of a site
    fn lemmas_of_site(&self, site_id: SiteId) -> Result<Vec<Lemma>>;

    /// Lemma rows whose text is in `texts`, restricted to `site_ids`
    fn find_lemmas(&self, texts: &[String], site_ids: &[SiteId]) -> Result<Vec<Lemma>>;

    /// Number of lemmas stored for a site
    fn count_lemmas(&self, site_id: SiteId) -> Result<usize>;

    // ---- index ----

    /// Insert index entries
    fn save_index(&self, entries: &[IndexEntry]) -> Result<()>;

    /// Ids of pages having an index entry for any of `lemma_ids`
    fn pages_with_lemmas(&self, lemma_ids: &[LemmaId]) -> Result<HashSet<PageId>>;

    /// Index entries joining `page_ids` and `lemma_ids`
    fn index_entries(&self, page_ids: &[PageId], lemma_ids: &[LemmaId]) -> Result<Vec<IndexEntry>>;

    /// Remove the lemma table and index entries of a site, keeping its pages
    fn clear_site_index(&self, site_id: SiteId) -> Result<()>;
}

/// Shared repository handle
pub type SharedIndexRepository = Arc<dyn IndexRepository>;

/// Open (or create) a SQLite-backed repository
pub fn create_sqlite_repository(path: impl AsRef<Path>) -> Result<SharedIndexRepository> {
    Ok(Arc::new(SqliteIndexRepository::new(path)?))
}

/// Create an empty in-memory repository
pub fn create_memory_repository() -> SharedIndexRepository {
    Arc::new(MemoryIndexRepository::new())
}
