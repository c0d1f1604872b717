//! sitesearch - lemma-based site crawler and search engine
//!
//! Crawls a configured set of sites, builds a per-site lemma index of
//! their pages and serves ranked full-text search with highlighted
//! snippets.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Concurrent site crawler and page fetcher
//! - [`lemma`] - Lemmatizer for Russian and English text
//! - [`indexing`] - Lemma table, page ranking, pipelines and campaigns
//! - [`search`] - Query evaluation and snippets
//! - [`parser`] - HTML zone extraction
//! - [`models`] - Core data structures and types
//! - [`storage`] - Index repositories (SQLite, in-memory)
//! - [`api`] - HTTP boundary
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sitesearch::config::Config;
//! use sitesearch::crawler::PageFetcher;
//! use sitesearch::indexing::IndexingService;
//! use sitesearch::lemma::Lemmatizer;
//! use sitesearch::storage::create_sqlite_repository;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(Config::load("sitesearch.toml".as_ref())?);
//!     let repo = create_sqlite_repository(&config.database.sqlite_path)?;
//!     let fetcher = Arc::new(PageFetcher::new(&config.crawler)?);
//!     let service = IndexingService::new(config, repo, Arc::new(Lemmatizer::new()), fetcher);
//!     service.start_indexing()?;
//!     service.wait().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod crawler;
pub mod error;
pub mod indexing;
pub mod lemma;
pub mod models;
pub mod parser;
pub mod search;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{PageFetcher, SiteCrawler};
    pub use crate::error::{Error, ErrorCategory, IndexingError, Result, SearchError};
    pub use crate::indexing::{IndexingService, SiteIndexer};
    pub use crate::lemma::Lemmatizer;
    pub use crate::models::{SearchResponse, SearchResult, SiteStatus, Statistics};
    pub use crate::search::SearchEngine;
    pub use crate::storage::{IndexRepository, SharedIndexRepository};
}
