//! End-to-end pipeline integration tests
//!
//! Tests the complete workflow for one site:
//! 1. Crawl (mocked HTTP)
//! 2. Page storage with site-relative paths
//! 3. Lemma table with document frequencies
//! 4. Ranked index entries
//! 5. Final site status

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use sitesearch::config::{Config, SiteConfig};
use sitesearch::indexing::SiteIndexer;
use sitesearch::lemma::Lemmatizer;
use sitesearch::models::{Site, SiteStatus};
use sitesearch::storage::{create_memory_repository, SharedIndexRepository};
use tokio_util::sync::CancellationToken;
use wiremock::MockServer;

use super::fixtures::{CATS_AND_DOGS_HTML, DOG_PAGE_HTML};
use crate::common::{mount_page, mount_pet_site, mount_status, page_html, test_config, test_fetcher};

fn indexer(config: &Config, repo: &SharedIndexRepository, cancel: CancellationToken) -> SiteIndexer {
    SiteIndexer::new(
        Arc::new(config.clone()),
        Arc::clone(repo),
        Arc::new(Lemmatizer::new()),
        test_fetcher(),
        cancel,
    )
}

async fn index(server: &MockServer, repo: &SharedIndexRepository) -> (SiteStatus, Site) {
    let config = test_config(&[(&server.uri(), "Test site")]);
    let site: SiteConfig = config.sites[0].clone();
    let status = indexer(&config, repo, CancellationToken::new())
        .index_site(&site)
        .await
        .unwrap();
    let stored = repo.find_site(&site.url).unwrap().unwrap();
    (status, stored)
}

/// (path, lemma, rank) triples of a site's index
fn index_snapshot(repo: &SharedIndexRepository, site: &Site) -> BTreeSet<(String, String, u32)> {
    let pages = repo.pages_of_site(site.id).unwrap();
    let lemmas = repo.lemmas_of_site(site.id).unwrap();
    let paths: HashMap<i64, &str> = pages.iter().map(|p| (p.id, p.path.as_str())).collect();
    let texts: HashMap<i64, &str> = lemmas.iter().map(|l| (l.id, l.lemma.as_str())).collect();

    let page_ids: Vec<i64> = pages.iter().map(|p| p.id).collect();
    let lemma_ids: Vec<i64> = lemmas.iter().map(|l| l.id).collect();
    repo.index_entries(&page_ids, &lemma_ids)
        .unwrap()
        .into_iter()
        .map(|e| {
            (
                paths[&e.page_id].to_string(),
                texts[&e.lemma_id].to_string(),
                (e.rank * 10.0).round() as u32,
            )
        })
        .collect()
}

// ============================================================================
// Complete Pipeline Tests
// ============================================================================

#[tokio::test]
async fn test_site_indexed_end_to_end() {
    let server = MockServer::start().await;
    mount_pet_site(&server).await;
    let repo = create_memory_repository();

    let (status, site) = index(&server, &repo).await;
    assert_eq!(status, SiteStatus::Indexed);
    assert_eq!(site.status, SiteStatus::Indexed);
    assert!(site.last_error.is_none());

    let paths: BTreeSet<String> = repo
        .pages_of_site(site.id)
        .unwrap()
        .into_iter()
        .map(|p| p.path)
        .collect();
    let expected: BTreeSet<String> = ["/", "/cats", "/cats/lions", "/dogs"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(paths, expected);

    let lemmas: HashMap<String, u32> = repo
        .lemmas_of_site(site.id)
        .unwrap()
        .into_iter()
        .map(|l| (l.lemma, l.frequency))
        .collect();
    assert_eq!(lemmas["cat"], 3);
    assert_eq!(lemmas["dog"], 2);
    assert_eq!(lemmas["lion"], 1);
    assert!(!lemmas.contains_key("and"));
}

#[tokio::test]
async fn test_lemma_frequency_equals_index_rows() {
    let server = MockServer::start().await;
    mount_pet_site(&server).await;
    let repo = create_memory_repository();

    let (_, site) = index(&server, &repo).await;

    let page_ids: Vec<i64> = repo
        .pages_of_site(site.id)
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    for lemma in repo.lemmas_of_site(site.id).unwrap() {
        let rows = repo.index_entries(&page_ids, &[lemma.id]).unwrap();
        assert_eq!(rows.len() as u32, lemma.frequency, "lemma {}", lemma.lemma);
    }
}

#[tokio::test]
async fn test_reindex_is_idempotent() {
    let server = MockServer::start().await;
    mount_pet_site(&server).await;
    let repo = create_memory_repository();

    let (_, first) = index(&server, &repo).await;
    let first_lemmas: BTreeSet<(String, u32)> = repo
        .lemmas_of_site(first.id)
        .unwrap()
        .into_iter()
        .map(|l| (l.lemma, l.frequency))
        .collect();
    let first_index = index_snapshot(&repo, &first);

    let (_, second) = index(&server, &repo).await;
    assert_ne!(first.id, second.id);
    assert_eq!(repo.all_sites().unwrap().len(), 1);

    let second_lemmas: BTreeSet<(String, u32)> = repo
        .lemmas_of_site(second.id)
        .unwrap()
        .into_iter()
        .map(|l| (l.lemma, l.frequency))
        .collect();
    assert_eq!(first_lemmas, second_lemmas);
    assert_eq!(first_index, index_snapshot(&repo, &second));
}

#[tokio::test]
async fn test_title_and_body_rank() {
    let server = MockServer::start().await;
    mount_page(&server, "/", DOG_PAGE_HTML).await;
    let repo = create_memory_repository();

    let (_, site) = index(&server, &repo).await;

    let snapshot = index_snapshot(&repo, &site);
    assert!(snapshot.contains(&("/".to_string(), "dog".to_string(), 26)));
}

#[tokio::test]
async fn test_closed_class_words_are_not_indexed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", CATS_AND_DOGS_HTML).await;
    let repo = create_memory_repository();

    let (_, site) = index(&server, &repo).await;

    let lemmas: BTreeSet<String> = repo
        .lemmas_of_site(site.id)
        .unwrap()
        .into_iter()
        .map(|l| {
            assert_eq!(l.frequency, 1);
            l.lemma
        })
        .collect();
    let expected: BTreeSet<String> = ["cat", "dog", "independent", "loyal"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(lemmas, expected);
}

#[tokio::test]
async fn test_failed_pages_are_stored_but_not_indexed() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        &page_html("Home", "Welcome home", &["/missing", "/broken"]),
    )
    .await;
    mount_status(&server, "/missing", 404).await;
    mount_status(&server, "/broken", 503).await;
    let repo = create_memory_repository();

    let (status, site) = index(&server, &repo).await;
    assert_eq!(status, SiteStatus::Indexed);

    let pages = repo.pages_of_site(site.id).unwrap();
    assert_eq!(pages.len(), 3);
    let failed: Vec<_> = pages.iter().filter(|p| !p.is_indexable()).collect();
    assert_eq!(failed.len(), 2);
    assert!(failed.iter().all(|p| p.code == 500 && p.content.is_empty()));

    for lemma in repo.lemmas_of_site(site.id).unwrap() {
        assert_eq!(lemma.frequency, 1);
    }
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancelled_pipeline_marks_site_failed() {
    let server = MockServer::start().await;
    mount_pet_site(&server).await;
    let repo = create_memory_repository();

    let config = test_config(&[(&server.uri(), "Test site")]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let status = indexer(&config, &repo, cancel)
        .index_site(&config.sites[0])
        .await
        .unwrap();
    assert_eq!(status, SiteStatus::Failed);

    let site = repo.find_site(&config.sites[0].url).unwrap().unwrap();
    assert_eq!(site.status, SiteStatus::Failed);
    assert_eq!(site.last_error.as_deref(), Some("crawl interrupted"));
    assert_eq!(repo.count_lemmas(site.id).unwrap(), 0);
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
