//! In-memory implementation of [`IndexRepository`]
//!
//! Used by tests and by the CLI when no database should be touched.

use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{bail, Result};
use chrono::Utc;

use super::IndexRepository;
use crate::models::{
    IndexEntry, Lemma, LemmaId, NewPage, Page, PageId, Site, SiteId, SiteStatus,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    sites: BTreeMap<SiteId, Site>,
    pages: BTreeMap<PageId, Page>,
    lemmas: BTreeMap<LemmaId, Lemma>,
    index: Vec<IndexEntry>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn site_page_ids(&self, site_id: SiteId) -> HashSet<PageId> {
        self.pages
            .values()
            .filter(|p| p.site_id == site_id)
            .map(|p| p.id)
            .collect()
    }
}

/// Map-backed index store
#[derive(Default)]
pub struct MemoryIndexRepository {
    tables: RwLock<Tables>,
}

impl MemoryIndexRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl IndexRepository for MemoryIndexRepository {
    fn find_site(&self, url: &str) -> Result<Option<Site>> {
        Ok(self
            .read()
            .sites
            .values()
            .rev()
            .find(|s| s.url == url)
            .cloned())
    }

    fn all_sites(&self) -> Result<Vec<Site>> {
        Ok(self.read().sites.values().cloned().collect())
    }

    fn create_site(&self, url: &str, name: &str, status: SiteStatus) -> Result<Site> {
        let mut tables = self.write();
        let site = Site {
            id: tables.next_id(),
            url: url.to_string(),
            name: name.to_string(),
            status,
            status_time: Utc::now(),
            last_error: None,
        };
        tables.sites.insert(site.id, site.clone());
        Ok(site)
    }

    fn update_site_status(
        &self,
        site_id: SiteId,
        status: SiteStatus,
        last_error: Option<&str>,
    ) -> Result<()> {
        if let Some(site) = self.write().sites.get_mut(&site_id) {
            site.status = status;
            site.status_time = Utc::now();
            site.last_error = last_error.map(str::to_string);
        }
        Ok(())
    }

    fn delete_site(&self, site_id: SiteId) -> Result<()> {
        let mut tables = self.write();
        let pages = tables.site_page_ids(site_id);
        tables.index.retain(|e| !pages.contains(&e.page_id));
        tables.pages.retain(|_, p| p.site_id != site_id);
        tables.lemmas.retain(|_, l| l.site_id != site_id);
        tables.sites.remove(&site_id);
        Ok(())
    }

    fn save_pages(&self, site_id: SiteId, pages: &[NewPage]) -> Result<Vec<PageId>> {
        let mut tables = self.write();
        if !tables.sites.contains_key(&site_id) {
            bail!("Site {site_id} does not exist");
        }

        let mut ids = Vec::with_capacity(pages.len());
        for page in pages {
            let id = tables.next_id();
            tables.pages.insert(
                id,
                Page {
                    id,
                    site_id,
                    path: page.path.clone(),
                    code: page.code,
                    content: page.content.clone(),
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    fn pages_of_site(&self, site_id: SiteId) -> Result<Vec<Page>> {
        Ok(self
            .read()
            .pages
            .values()
            .filter(|p| p.site_id == site_id)
            .cloned()
            .collect())
    }

    fn pages_by_ids(&self, ids: &[PageId]) -> Result<Vec<Page>> {
        let tables = self.read();
        let mut pages: Vec<Page> = ids
            .iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .filter_map(|id| tables.pages.get(id).cloned())
            .collect();
        pages.sort_by_key(|p| p.id);
        Ok(pages)
    }

    fn count_pages(&self, site_id: SiteId) -> Result<usize> {
        Ok(self
            .read()
            .pages
            .values()
            .filter(|p| p.site_id == site_id)
            .count())
    }

    fn save_lemmas(&self, site_id: SiteId, lemmas: &[(String, u32)]) -> Result<Vec<Lemma>> {
        let mut tables = self.write();
        if !tables.sites.contains_key(&site_id) {
            bail!("Site {site_id} does not exist");
        }

        let mut seen = HashSet::new();
        for (lemma, _) in lemmas {
            let exists = tables
                .lemmas
                .values()
                .any(|l| l.site_id == site_id && &l.lemma == lemma);
            if exists || !seen.insert(lemma.as_str()) {
                bail!("Lemma {lemma} already exists for site {site_id}");
            }
        }

        let mut saved = Vec::with_capacity(lemmas.len());
        for (lemma, frequency) in lemmas {
            let row = Lemma {
                id: tables.next_id(),
                site_id,
                lemma: lemma.clone(),
                frequency: *frequency,
            };
            tables.lemmas.insert(row.id, row.clone());
            saved.push(row);
        }
        Ok(saved)
    }

    fn lemmas_of_site(&self, site_id: SiteId) -> Result<Vec<Lemma>> {
        Ok(self
            .read()
            .lemmas
            .values()
            .filter(|l| l.site_id == site_id)
            .cloned()
            .collect())
    }

    fn find_lemmas(&self, texts: &[String], site_ids: &[SiteId]) -> Result<Vec<Lemma>> {
        let texts: HashSet<&str> = texts.iter().map(String::as_str).collect();
        Ok(self
            .read()
            .lemmas
            .values()
            .filter(|l| texts.contains(l.lemma.as_str()) && site_ids.contains(&l.site_id))
            .cloned()
            .collect())
    }

    fn count_lemmas(&self, site_id: SiteId) -> Result<usize> {
        Ok(self
            .read()
            .lemmas
            .values()
            .filter(|l| l.site_id == site_id)
            .count())
    }

    fn save_index(&self, entries: &[IndexEntry]) -> Result<()> {
        let mut tables = self.write();
        for entry in entries {
            if !tables.pages.contains_key(&entry.page_id)
                || !tables.lemmas.contains_key(&entry.lemma_id)
            {
                bail!(
                    "Index entry references missing page {} or lemma {}",
                    entry.page_id,
                    entry.lemma_id
                );
            }
        }
        tables.index.extend_from_slice(entries);
        Ok(())
    }

    fn pages_with_lemmas(&self, lemma_ids: &[LemmaId]) -> Result<HashSet<PageId>> {
        Ok(self
            .read()
            .index
            .iter()
            .filter(|e| lemma_ids.contains(&e.lemma_id))
            .map(|e| e.page_id)
            .collect())
    }

    fn index_entries(&self, page_ids: &[PageId], lemma_ids: &[LemmaId]) -> Result<Vec<IndexEntry>> {
        let pages: HashSet<PageId> = page_ids.iter().copied().collect();
        let lemmas: HashSet<LemmaId> = lemma_ids.iter().copied().collect();
        Ok(self
            .read()
            .index
            .iter()
            .filter(|e| pages.contains(&e.page_id) && lemmas.contains(&e.lemma_id))
            .copied()
            .collect())
    }

    fn clear_site_index(&self, site_id: SiteId) -> Result<()> {
        let mut tables = self.write();
        let pages = tables.site_page_ids(site_id);
        tables.index.retain(|e| !pages.contains(&e.page_id));
        tables.lemmas.retain(|_, l| l.site_id != site_id);
        Ok(())
    }
}
