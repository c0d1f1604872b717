//! Search over sites indexed through the service

use sitesearch::error::SearchError;
use wiremock::MockServer;

use crate::common::{mount_page, mount_pet_site, page_html, test_app, test_config, TestApp};

async fn indexed_pet_site() -> (MockServer, TestApp) {
    let server = MockServer::start().await;
    mount_pet_site(&server).await;
    let app = test_app(test_config(&[(&server.uri(), "Pets")]));
    app.service.start_indexing().unwrap();
    app.service.wait().await;
    (server, app)
}

#[tokio::test]
async fn test_single_lemma_search() {
    let (server, app) = indexed_pet_site().await;

    let response = app.search.search("cats", None, 0, 30).unwrap();
    assert_eq!(response.count, 3);
    assert_eq!(response.data.len(), 3);

    assert_eq!(response.data[0].uri, "/cats");
    assert!((response.data[0].relevance - 1.0).abs() < 1e-6);
    for result in &response.data {
        assert!(result.relevance > 0.0 && result.relevance <= 1.0);
        assert_eq!(result.site, server.uri());
        assert_eq!(result.site_name, "Pets");
        assert!(result.snippet.contains("<b>"), "{}", result.snippet);
    }
    let relevances: Vec<f32> = response.data.iter().map(|r| r.relevance).collect();
    assert!(relevances.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_all_query_lemmas_required() {
    let (_server, app) = indexed_pet_site().await;

    let response = app.search.search("cat dog", None, 0, 30).unwrap();
    assert_eq!(response.count, 1);
    assert_eq!(response.data[0].uri, "/");
    assert_eq!(response.data[0].title, "Pets");
    assert!((response.data[0].relevance - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_pagination_windows() {
    let (_server, app) = indexed_pet_site().await;

    let full: Vec<String> = app
        .search
        .search("cat", None, 0, 30)
        .unwrap()
        .data
        .into_iter()
        .map(|r| r.uri)
        .collect();

    for offset in 0..=full.len() {
        for limit in 1..=2 {
            let window: Vec<String> = app
                .search
                .search("cat", None, offset, limit)
                .unwrap()
                .data
                .into_iter()
                .map(|r| r.uri)
                .collect();
            let end = (offset + limit).min(full.len());
            assert_eq!(window, full[offset..end], "offset {offset} limit {limit}");
        }
    }
}

#[tokio::test]
async fn test_site_filter() {
    let (server, app) = indexed_pet_site().await;

    let scoped = app
        .search
        .search("dog", Some(&format!("{}/", server.uri())), 0, 30)
        .unwrap();
    assert_eq!(scoped.count, 2);

    let err = app
        .search
        .search("dog", Some("https://unknown.example"), 0, 30)
        .unwrap_err();
    assert!(matches!(err, SearchError::UnknownSite(_)));

    let err = app.search.search("", Some("unknown-url"), 0, 30).unwrap_err();
    assert!(matches!(err, SearchError::UnknownSite(_)));
}

#[tokio::test]
async fn test_search_across_two_sites() {
    let first = MockServer::start().await;
    mount_pet_site(&first).await;
    let second = MockServer::start().await;
    mount_page(&second, "/", &page_html("Zoo", "The zoo has a lion.", &[])).await;

    let app = test_app(test_config(&[(&first.uri(), "Pets"), (&second.uri(), "Zoo")]));
    app.service.start_indexing().unwrap();
    app.service.wait().await;

    let response = app.search.search("lion", None, 0, 30).unwrap();
    assert_eq!(response.count, 2);
    let sites: Vec<&str> = response.data.iter().map(|r| r.site.as_str()).collect();
    assert!(sites.contains(&first.uri().as_str()));
    assert!(sites.contains(&second.uri().as_str()));
}

#[tokio::test]
async fn test_title_is_truncated() {
    let server = MockServer::start().await;
    let title = format!("Parrot {}", "x".repeat(400));
    mount_page(&server, "/", &page_html(&title, "parrot", &[])).await;

    let app = test_app(test_config(&[(&server.uri(), "Birds")]));
    app.service.start_indexing().unwrap();
    app.service.wait().await;

    let response = app.search.search("parrot", None, 0, 30).unwrap();
    assert_eq!(response.count, 1);
    assert_eq!(response.data[0].title.chars().count(), 300);
}
