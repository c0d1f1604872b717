//! Lemma table and page ranking
//!
//! Each indexable page is lemmatized zone by zone. The site's lemma table
//! counts, per lemma, the pages containing it at least once (document
//! frequency). Index entries weight title occurrences fully and body
//! occurrences by [`BODY_WEIGHT`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::LemmaError;
use crate::lemma::Lemmatizer;
use crate::models::{IndexEntry, Lemma, PageId};
use crate::parser::PageZones;

/// Weight of one body occurrence relative to one title occurrence
pub const BODY_WEIGHT: f32 = 0.8;

/// Per-zone term frequencies of one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLemmas {
    pub page_id: PageId,
    pub title: HashMap<String, usize>,
    pub body: HashMap<String, usize>,
}

impl PageLemmas {
    /// Lemmas present in either zone, sorted
    pub fn lemmas(&self) -> BTreeSet<&str> {
        self.title
            .keys()
            .chain(self.body.keys())
            .map(String::as_str)
            .collect()
    }

    /// `title_count + body_count * BODY_WEIGHT`, zero when absent from both zones
    pub fn rank(&self, lemma: &str) -> f32 {
        let title = self.title.get(lemma).copied().unwrap_or(0);
        let body = self.body.get(lemma).copied().unwrap_or(0);
        title as f32 + body as f32 * BODY_WEIGHT
    }
}

/// Lemmatize the title and body zones of a page
pub fn analyze_page(
    lemmatizer: &Lemmatizer,
    page_id: PageId,
    html: &str,
) -> Result<PageLemmas, LemmaError> {
    let zones = PageZones::parse(html);
    Ok(PageLemmas {
        page_id,
        title: lemmatizer.lemma_frequencies(&zones.title)?,
        body: lemmatizer.lemma_frequencies(&zones.body)?,
    })
}

/// Document frequency of every lemma across `pages`
pub fn build_lemma_table(pages: &[PageLemmas]) -> BTreeMap<String, u32> {
    let mut table = BTreeMap::new();
    for page in pages {
        for lemma in page.lemmas() {
            *table.entry(lemma.to_string()).or_insert(0) += 1;
        }
    }
    table
}

/// One index entry per (page, lemma) pair where the lemma occurs
///
/// Lemmas missing from `lemmas` are skipped.
pub fn rank_pages(pages: &[PageLemmas], lemmas: &[Lemma]) -> Vec<IndexEntry> {
    let ids: HashMap<&str, i64> = lemmas.iter().map(|l| (l.lemma.as_str(), l.id)).collect();

    let mut entries = Vec::new();
    for page in pages {
        for lemma in page.lemmas() {
            if let Some(&lemma_id) = ids.get(lemma) {
                entries.push(IndexEntry {
                    page_id: page.page_id,
                    lemma_id,
                    rank: page.rank(lemma),
                });
            }
        }
    }
    entries
}
