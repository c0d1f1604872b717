//! REST API handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::server::AppState;
use crate::error::{Error, ErrorCategory, IndexingError, SearchError};
use crate::models::{SearchResult, Statistics};

// ============================================================================
// API Response Types
// ============================================================================

/// Body of every non-statistics response
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    pub result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<SearchResult>>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            result: true,
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Body of `GET /api/statistics`
#[derive(Debug, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub result: bool,
    pub statistics: Statistics,
}

/// Failure rendered as `{ "result": false, "error": ... }`
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    /// Usage error such as a missing parameter
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(Error::config(message))
    }

    pub fn status(&self) -> StatusCode {
        match self.0.category() {
            ErrorCategory::Config | ErrorCategory::Parsing => StatusCode::BAD_REQUEST,
            ErrorCategory::Indexing => StatusCode::CONFLICT,
            ErrorCategory::Storage | ErrorCategory::Other => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message without the category prefix of the unified error
    pub fn message(&self) -> String {
        match &self.0 {
            Error::Indexing(e) => e.to_string(),
            Error::Search(e) => e.to_string(),
            Error::Config(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(ApiResponse::error(self.message()))).into_response()
    }
}

impl From<IndexingError> for ApiError {
    fn from(err: IndexingError) -> Self {
        Self(err.into())
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self(err.into())
    }
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct IndexPageParams {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub site: Option<String>,
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/statistics", get(statistics))
        .route("/api/startIndexing", get(start_indexing))
        .route("/api/stopIndexing", get(stop_indexing))
        .route("/api/indexPage", post(index_page))
        .route("/api/search", get(search))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn statistics(State(state): State<AppState>) -> Result<Json<StatisticsResponse>, ApiError> {
    let statistics = state.service.statistics()?;
    Ok(Json(StatisticsResponse {
        result: true,
        statistics,
    }))
}

async fn start_indexing(State(state): State<AppState>) -> Result<Json<ApiResponse>, ApiError> {
    state.service.start_indexing()?;
    Ok(Json(ApiResponse::ok()))
}

async fn stop_indexing(State(state): State<AppState>) -> Result<Json<ApiResponse>, ApiError> {
    state.service.stop_indexing()?;
    Ok(Json(ApiResponse::ok()))
}

async fn index_page(
    State(state): State<AppState>,
    Query(params): Query<IndexPageParams>,
) -> Result<Json<ApiResponse>, ApiError> {
    let url = params.url.trim();
    if url.is_empty() {
        return Err(ApiError::bad_request("page not specified"));
    }
    state.service.index_page(url)?;
    Ok(Json(ApiResponse::ok()))
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse>, ApiError> {
    let limit = params.limit.unwrap_or(state.default_limit);
    let engine = state.search.clone();

    let response = tokio::task::spawn_blocking(move || {
        engine.search(&params.query, params.site.as_deref(), params.offset, limit)
    })
    .await
    .map_err(|e| ApiError(Error::other(format!("Search task failed: {e}"))))??;

    Ok(Json(ApiResponse {
        result: true,
        error: None,
        count: Some(response.count),
        data: Some(response.data),
    }))
}
