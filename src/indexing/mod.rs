//! Site indexing: lemma tables, page ranking, per-site pipelines and the
//! campaign service that runs them

pub mod pipeline;
pub mod ranker;
pub mod service;

pub use pipeline::{BuildSummary, SiteIndexer};
pub use ranker::{analyze_page, build_lemma_table, rank_pages, PageLemmas, BODY_WEIGHT};
pub use service::IndexingService;
