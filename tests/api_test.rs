//! HTTP boundary tests using `tower::ServiceExt::oneshot`

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

use common::{mount_pet_site, test_app, test_config, TestApp};
use sitesearch::api::{create_router, AppState};

fn router(app: &TestApp) -> Router {
    create_router(AppState {
        service: app.service.clone(),
        search: app.search.clone(),
        default_limit: 30,
    })
}

async fn call(router: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    call(router, Method::GET, uri).await
}

#[tokio::test]
async fn test_statistics_of_empty_index() {
    let app = test_app(test_config(&[("https://example.com", "Example")]));
    let (status, body) = get(&router(&app), "/api/statistics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], true);
    assert_eq!(body["statistics"]["total"]["sites"], 1);
    assert_eq!(body["statistics"]["total"]["indexing"], false);
    assert_eq!(body["statistics"]["detailed"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_stop_without_campaign_conflicts() {
    let app = test_app(test_config(&[("https://example.com", "Example")]));
    let (status, body) = get(&router(&app), "/api/stopIndexing").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["result"], false);
    assert_eq!(body["error"], "Indexing is not running");
}

#[tokio::test]
async fn test_index_page_usage_errors() {
    let app = test_app(test_config(&[("https://example.com", "Example")]));
    let router = router(&app);

    let (status, body) = call(&router, Method::POST, "/api/indexPage").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "page not specified");

    let (status, body) = call(&router, Method::POST, "/api/indexPage?url=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "page not specified");

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/indexPage?url=https%3A%2F%2Fother.example",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["result"], false);
    assert!(body["error"].as_str().unwrap().contains("https://other.example"));
}

#[tokio::test]
async fn test_search_unknown_site_is_rejected() {
    let app = test_app(test_config(&[("https://example.com", "Example")]));
    let (status, body) = get(&router(&app), "/api/search?query=&site=unknown-url").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["result"], false);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_indexing_then_search() {
    let server = MockServer::start().await;
    mount_pet_site(&server).await;
    let app = test_app(test_config(&[(&server.uri(), "Pets")]));
    let router = router(&app);

    let (status, body) = get(&router, "/api/startIndexing").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "result": true }));

    let (status, body) = get(&router, "/api/startIndexing").await;
    if app.service.is_indexing() {
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Indexing is already running");
    }
    app.service.wait().await;

    let (status, body) = get(&router, "/api/search?query=cats&offset=1&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], true);
    assert_eq!(body["count"], 3);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["site"], server.uri());
    assert_eq!(data[0]["siteName"], "Pets");
    assert!(data[0]["relevance"].as_f64().unwrap() < 1.0);

    let (status, body) = get(&router, "/api/statistics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statistics"]["detailed"][0]["status"], "INDEXED");
    assert_eq!(body["statistics"]["total"]["pages"], 4);
}

#[tokio::test]
async fn test_search_default_limit() {
    let server = MockServer::start().await;
    mount_pet_site(&server).await;
    let app = test_app(test_config(&[(&server.uri(), "Pets")]));
    app.service.start_indexing().unwrap();
    app.service.wait().await;

    let router = create_router(AppState {
        service: app.service.clone(),
        search: app.search.clone(),
        default_limit: 2,
    });
    let (status, body) = get(&router, "/api/search?query=cat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}
