//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use sitesearch::config::{Config, SiteConfig};
use sitesearch::crawler::PageFetcher;
use sitesearch::indexing::IndexingService;
use sitesearch::lemma::Lemmatizer;
use sitesearch::search::SearchEngine;
use sitesearch::storage::{create_memory_repository, SharedIndexRepository};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Build an HTML page with a title, body text and links
pub fn page_html(title: &str, body: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{href}">link</a>"#))
        .collect();
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head>\
         <body><p>{body}</p>{anchors}</body></html>"
    )
}

/// Serve `html` at `route`
pub async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(html),
        )
        .mount(server)
        .await;
}

/// Respond to `route` with a bare status code
pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// A small pet site:
///
/// ```text
/// /            links /cats /dogs /about.pdf
/// /cats        links /cats/lions
/// /cats/lions
/// /dogs
/// ```
pub async fn mount_pet_site(server: &MockServer) {
    mount_page(
        server,
        "/",
        &page_html(
            "Pets",
            "Cats and dogs live here.",
            &["/cats", "/dogs", "/about.pdf", "#top"],
        ),
    )
    .await;
    mount_page(
        server,
        "/cats",
        &page_html("Cats", "Cats purr. Cats sleep.", &["/cats/lions", "/"]),
    )
    .await;
    mount_page(
        server,
        "/cats/lions",
        &page_html("Lions", "Lions are big cats.", &[]),
    )
    .await;
    mount_page(
        server,
        "/dogs",
        &page_html("Dogs", "Dogs bark. A dog is loyal.", &[]),
    )
    .await;
}

/// Configuration with no politeness delay and the given sites
pub fn test_config(sites: &[(&str, &str)]) -> Config {
    let mut config = Config::default();
    config.crawler.politeness_delay_ms = 0;
    config.crawler.request_timeout_secs = 5;
    config.crawler.workers = Some(4);
    config.sites = sites
        .iter()
        .map(|(url, name)| SiteConfig {
            url: url.trim_end_matches('/').to_string(),
            name: name.to_string(),
        })
        .collect();
    config
}

pub fn test_fetcher() -> Arc<PageFetcher> {
    Arc::new(
        PageFetcher::with_timeout("SiteSearchTest/1.0", "https://referrer.test", Duration::from_secs(5))
            .unwrap(),
    )
}

/// Service and search engine sharing one in-memory repository
pub struct TestApp {
    pub repo: SharedIndexRepository,
    pub service: Arc<IndexingService>,
    pub search: Arc<SearchEngine>,
}

pub fn test_app(config: Config) -> TestApp {
    let repo = create_memory_repository();
    let lemmatizer = Arc::new(Lemmatizer::new());
    let service = Arc::new(IndexingService::new(
        Arc::new(config),
        Arc::clone(&repo),
        Arc::clone(&lemmatizer),
        test_fetcher(),
    ));
    let search = Arc::new(SearchEngine::new(Arc::clone(&repo), lemmatizer));
    TestApp {
        repo,
        service,
        search,
    }
}
