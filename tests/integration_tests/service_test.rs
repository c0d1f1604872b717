//! Indexing campaigns through the service

use std::time::Duration;

use sitesearch::error::IndexingError;
use sitesearch::models::SiteStatus;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{mount_page, mount_pet_site, page_html, test_app, test_config};

/// Site whose pages answer slowly
async fn slow_site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(page_html("Slow", "slow turtles", &["/a", "/b", "/c"]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_campaign_indexes_all_sites() {
    let pets = MockServer::start().await;
    mount_pet_site(&pets).await;
    let zoo = MockServer::start().await;
    mount_page(&zoo, "/", &page_html("Zoo", "Zebras and lions", &[])).await;

    let app = test_app(test_config(&[(&pets.uri(), "Pets"), (&zoo.uri(), "Zoo")]));
    app.service.start_indexing().unwrap();
    app.service.wait().await;
    assert!(!app.service.is_indexing());

    let stats = app.service.statistics().unwrap();
    assert_eq!(stats.total.sites, 2);
    assert_eq!(stats.total.pages, 5);
    assert!(stats.total.lemmas > 0);
    assert!(!stats.total.indexing);
    assert_eq!(stats.detailed.len(), 2);
    for site in &stats.detailed {
        assert_eq!(site.status, SiteStatus::Indexed, "{}", site.url);
        assert!(site.error.is_none());
    }
}

#[tokio::test]
async fn test_second_campaign_is_rejected() {
    let server = slow_site().await;
    let app = test_app(test_config(&[(&server.uri(), "Slow")]));

    app.service.start_indexing().unwrap();
    assert!(app.service.is_indexing());
    assert!(matches!(
        app.service.start_indexing(),
        Err(IndexingError::AlreadyActive)
    ));
    assert!(matches!(
        app.service.index_page(&server.uri()),
        Err(IndexingError::AlreadyActive)
    ));

    app.service.wait().await;
    assert!(app.service.start_indexing().is_ok());
    app.service.wait().await;
}

#[tokio::test]
async fn test_stop_marks_sites_failed() {
    let server = slow_site().await;
    let app = test_app(test_config(&[(&server.uri(), "Slow")]));

    app.service.start_indexing().unwrap();
    // let the pipeline begin its crawl before stopping
    tokio::time::sleep(Duration::from_millis(100)).await;
    app.service.stop_indexing().unwrap();
    app.service.wait().await;

    let site = app.repo.find_site(&server.uri()).unwrap().unwrap();
    assert_eq!(site.status, SiteStatus::Failed);
    assert_eq!(site.last_error.as_deref(), Some("crawl interrupted"));
    assert_eq!(app.repo.count_lemmas(site.id).unwrap(), 0);

    assert!(matches!(
        app.service.stop_indexing(),
        Err(IndexingError::NotActive)
    ));
}

#[tokio::test]
async fn test_index_page_reindexes_one_site() {
    let pets = MockServer::start().await;
    mount_pet_site(&pets).await;
    let zoo = MockServer::start().await;
    mount_page(&zoo, "/", &page_html("Zoo", "Zebras", &[])).await;

    let app = test_app(test_config(&[(&pets.uri(), "Pets"), (&zoo.uri(), "Zoo")]));
    app.service.index_page(&format!("{}/", zoo.uri())).unwrap();
    app.service.wait().await;

    let sites = app.repo.all_sites().unwrap();
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].url, zoo.uri());
    assert_eq!(sites[0].status, SiteStatus::Indexed);

    assert!(matches!(
        app.service.index_page("https://elsewhere.example"),
        Err(IndexingError::UnknownSite(_))
    ));
}

#[tokio::test]
async fn test_stop_keeps_index_of_sites_not_started() {
    let pets = MockServer::start().await;
    mount_pet_site(&pets).await;
    let slow = slow_site().await;

    let app = test_app(test_config(&[(&pets.uri(), "Pets"), (&slow.uri(), "Slow")]));
    app.service.index_page(&pets.uri()).unwrap();
    app.service.wait().await;
    let before = app.repo.find_site(&pets.uri()).unwrap().unwrap();
    let lemmas = app.repo.count_lemmas(before.id).unwrap();
    assert!(lemmas > 0);

    // stopped before any pipeline task has run
    app.service.start_indexing().unwrap();
    app.service.stop_indexing().unwrap();
    app.service.wait().await;

    let after = app.repo.find_site(&pets.uri()).unwrap().unwrap();
    assert_eq!(after.status, SiteStatus::Indexed);
    assert_eq!(after.id, before.id);
    assert_eq!(app.repo.count_lemmas(after.id).unwrap(), lemmas);
    assert!(app.repo.find_site(&slow.uri()).unwrap().is_none());
    assert!(slow.received_requests().await.unwrap_or_default().is_empty());
}
