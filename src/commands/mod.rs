pub mod index;
pub mod search;
pub mod serve;
pub mod stats;

use std::sync::Arc;

use anyhow::{Context, Result};

use sitesearch::config::Config;
use sitesearch::crawler::PageFetcher;
use sitesearch::indexing::IndexingService;
use sitesearch::lemma::Lemmatizer;
use sitesearch::search::SearchEngine;
use sitesearch::storage::create_sqlite_repository;

// Re-export command functions for convenience
pub use index::index;
pub use search::search;
pub use serve::serve;
pub use stats::stats;

/// Components shared by every command
pub struct AppContext {
    pub config: Arc<Config>,
    pub service: Arc<IndexingService>,
    pub search: Arc<SearchEngine>,
}

impl AppContext {
    /// Open the database for `config` and recover stale runs
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let repo = create_sqlite_repository(&config.database.sqlite_path).with_context(|| {
            format!(
                "Failed to open database: {}",
                config.database.sqlite_path.display()
            )
        })?;
        let lemmatizer = Arc::new(Lemmatizer::new());
        let fetcher =
            Arc::new(PageFetcher::new(&config.crawler).context("Failed to create fetcher")?);

        let service = Arc::new(IndexingService::new(
            Arc::clone(&config),
            Arc::clone(&repo),
            Arc::clone(&lemmatizer),
            fetcher,
        ));
        let recovered = service.recover_interrupted()?;
        if recovered > 0 {
            tracing::warn!(sites = recovered, "Recovered sites left indexing");
        }

        let search = Arc::new(
            SearchEngine::new(repo, lemmatizer)
                .with_snippet_fragments(config.search.snippet_fragments),
        );

        Ok(Self {
            config,
            service,
            search,
        })
    }
}
