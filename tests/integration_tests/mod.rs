//! Integration tests module
//!
//! End-to-end tests against sites served by wiremock:
//! - Crawl → lemma table → index pipeline for one site
//! - Search over indexed sites
//! - Indexing campaigns started and stopped through the service
//! - Fetch failures and unusual content

pub mod error_scenarios;
pub mod fixtures;
pub mod pipeline_test;
pub mod search_test;
pub mod service_test;
