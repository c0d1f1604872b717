//! HTTP boundary
//!
//! - [`handlers`] maps query parameters onto the indexing service and the
//!   search engine and renders JSON responses
//! - [`server`] owns the shared state and runs the axum server

pub mod handlers;
pub mod server;

pub use handlers::{create_router, ApiError, ApiResponse, StatisticsResponse};
pub use server::{ApiServer, AppState};
