//! Error scenario integration tests
//!
//! Tests failure modes that must degrade rather than abort:
//! 1. Unreachable sites
//! 2. Timeouts
//! 3. Malformed HTML
//! 4. Legacy encodings

use std::sync::Arc;
use std::time::Duration;

use sitesearch::crawler::{PageFetcher, SiteCrawler};
use sitesearch::error::FetchError;
use sitesearch::models::SiteStatus;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{russian_page_bytes, MALFORMED_HTML, RUSSIAN_TITLE};
use crate::common::{mount_page, page_html, test_app, test_config};

// ============================================================================
// Network Error Tests
// ============================================================================

#[tokio::test]
async fn test_unreachable_site_is_indexed_with_failed_page() {
    // Nothing listens on port 9 of the loopback interface.
    let url = "http://127.0.0.1:9";
    let app = test_app(test_config(&[(url, "Nowhere")]));

    app.service.start_indexing().unwrap();
    app.service.wait().await;

    let site = app.repo.find_site(url).unwrap().unwrap();
    assert_eq!(site.status, SiteStatus::Indexed);

    let pages = app.repo.pages_of_site(site.id).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].path, "/");
    assert_eq!(pages[0].code, 500);
    assert_eq!(app.repo.count_lemmas(site.id).unwrap(), 0);
}

#[tokio::test]
async fn test_timeout_degrades_to_failed_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &page_html("Home", "home", &["/slow"])).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let fetcher = Arc::new(
        PageFetcher::with_timeout("SiteSearchTest/1.0", "", Duration::from_millis(300)).unwrap(),
    );
    let crawler = SiteCrawler::new(
        Arc::clone(&fetcher),
        &server.uri(),
        2,
        Duration::ZERO,
        CancellationToken::new(),
    );

    let mut pages = crawler.crawl(&format!("{}/", server.uri())).await.unwrap();
    pages.sort_by(|a, b| a.url.cmp(&b.url));
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].code, 200);
    assert_eq!(pages[1].code, 500);
    assert!(pages[1].content.is_empty());

    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout));
    assert!(err.is_recoverable());
}

// ============================================================================
// Content Tests
// ============================================================================

#[tokio::test]
async fn test_malformed_html_is_indexed() {
    let server = MockServer::start().await;
    mount_page(&server, "/", MALFORMED_HTML).await;

    let app = test_app(test_config(&[(&server.uri(), "Broken")]));
    app.service.start_indexing().unwrap();
    app.service.wait().await;

    let response = app.search.search("parrots", None, 0, 10).unwrap();
    assert_eq!(response.count, 1);
    assert_eq!(response.data[0].uri, "/");
}

#[tokio::test]
async fn test_windows_1251_page_is_searchable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=windows-1251")
                .set_body_bytes(russian_page_bytes()),
        )
        .mount(&server)
        .await;

    let app = test_app(test_config(&[(&server.uri(), "Русский")]));
    app.service.start_indexing().unwrap();
    app.service.wait().await;

    let response = app.search.search("собака", None, 0, 10).unwrap();
    assert_eq!(response.count, 1);
    assert_eq!(response.data[0].title, RUSSIAN_TITLE);
    assert!(response.data[0].snippet.contains("<b>"));
}
