//! Indexing campaigns
//!
//! A campaign runs one [`SiteIndexer`] per site on the tokio runtime, at
//! most `workers` at a time. Only one campaign may run in the process, and
//! none may start while any stored site is still INDEXING. Stopping a
//! campaign cancels its token; pipelines notice at their next checkpoint.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use super::pipeline::SiteIndexer;
use crate::config::{Config, SiteConfig};
use crate::crawler::PageFetcher;
use crate::error::IndexingError;
use crate::lemma::Lemmatizer;
use crate::models::{DetailedStatistics, SiteStatus, Statistics, TotalStatistics};
use crate::storage::SharedIndexRepository;

/// Error recorded on sites left INDEXING by a previous process
const INTERRUPTED: &str = "crawl interrupted";

/// Running campaign handle
struct Campaign {
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl Campaign {
    fn is_active(&self) -> bool {
        !self.tracker.is_empty()
    }
}

/// Starts, stops and reports on indexing campaigns
pub struct IndexingService {
    config: Arc<Config>,
    repo: SharedIndexRepository,
    lemmatizer: Arc<Lemmatizer>,
    fetcher: Arc<PageFetcher>,
    campaign: Mutex<Option<Campaign>>,
}

impl IndexingService {
    pub fn new(
        config: Arc<Config>,
        repo: SharedIndexRepository,
        lemmatizer: Arc<Lemmatizer>,
        fetcher: Arc<PageFetcher>,
    ) -> Self {
        Self {
            config,
            repo,
            lemmatizer,
            fetcher,
            campaign: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Campaign>> {
        self.campaign.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mark sites left INDEXING by a previous process as FAILED
    ///
    /// Call once at startup, before any campaign is started. Returns the
    /// number of sites updated.
    pub fn recover_interrupted(&self) -> Result<usize, IndexingError> {
        let mut recovered = 0;
        for site in self.repo.all_sites()? {
            if site.status == SiteStatus::Indexing {
                self.repo
                    .update_site_status(site.id, SiteStatus::Failed, Some(INTERRUPTED))?;
                tracing::warn!(site = %site.url, "Marked stale indexing run as failed");
                recovered += 1;
            }
        }
        Ok(recovered)
    }

    /// Whether a campaign started by this service is still running
    pub fn is_indexing(&self) -> bool {
        self.lock().as_ref().is_some_and(Campaign::is_active)
    }

    /// Start indexing every configured site
    ///
    /// # Errors
    ///
    /// `IndexingError::AlreadyActive` if a campaign is running or any
    /// stored site is INDEXING.
    pub fn start_indexing(&self) -> Result<(), IndexingError> {
        let sites = self.config.sites.clone();
        self.launch(sites)
    }

    /// Re-index the configured site whose URL is `url`
    ///
    /// # Errors
    ///
    /// - `IndexingError::UnknownSite` if `url` is not a configured site
    /// - `IndexingError::AlreadyActive` if indexing is running
    pub fn index_page(&self, url: &str) -> Result<(), IndexingError> {
        let site = self
            .config
            .site(url)
            .cloned()
            .ok_or_else(|| IndexingError::UnknownSite(url.to_string()))?;
        self.launch(vec![site])
    }

    /// Cancel the running campaign
    ///
    /// # Errors
    ///
    /// `IndexingError::NotActive` if no campaign is running.
    pub fn stop_indexing(&self) -> Result<(), IndexingError> {
        let guard = self.lock();
        match guard.as_ref() {
            Some(campaign) if campaign.is_active() => {
                tracing::info!("Stopping indexing");
                campaign.cancel.cancel();
                Ok(())
            }
            _ => Err(IndexingError::NotActive),
        }
    }

    /// Wait until the current campaign, if any, has finished
    pub async fn wait(&self) {
        let tracker = self.lock().as_ref().map(|c| c.tracker.clone());
        if let Some(tracker) = tracker {
            tracker.wait().await;
        }
    }

    /// Totals and per-site details
    pub fn statistics(&self) -> Result<Statistics, IndexingError> {
        let mut detailed = Vec::new();
        let mut total = TotalStatistics {
            sites: self.config.sites.len(),
            indexing: self.is_indexing(),
            ..TotalStatistics::default()
        };

        for site in self.repo.all_sites()? {
            let pages = self.repo.count_pages(site.id)?;
            let lemmas = self.repo.count_lemmas(site.id)?;
            total.pages += pages;
            total.lemmas += lemmas;
            detailed.push(DetailedStatistics {
                url: site.url,
                name: site.name,
                status: site.status,
                status_time: site.status_time,
                error: site.last_error,
                pages,
                lemmas,
            });
        }

        Ok(Statistics { total, detailed })
    }

    fn launch(&self, sites: Vec<SiteConfig>) -> Result<(), IndexingError> {
        let mut guard = self.lock();
        if guard.as_ref().is_some_and(Campaign::is_active) || self.repo.any_site_indexing()? {
            return Err(IndexingError::AlreadyActive);
        }

        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();
        let permits = Arc::new(Semaphore::new(self.config.workers().max(1)));
        let indexer = Arc::new(SiteIndexer::new(
            Arc::clone(&self.config),
            Arc::clone(&self.repo),
            Arc::clone(&self.lemmatizer),
            Arc::clone(&self.fetcher),
            cancel.clone(),
        ));

        tracing::info!(sites = sites.len(), "Indexing campaign started");

        for site in sites {
            let indexer = Arc::clone(&indexer);
            let permits = Arc::clone(&permits);
            let cancel = cancel.clone();
            tracker.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                // Sites that never started keep their previous index
                if cancel.is_cancelled() {
                    tracing::info!(site = %site.url, "Pipeline skipped after stop");
                    return;
                }
                match indexer.index_site(&site).await {
                    Ok(status) => {
                        tracing::debug!(site = %site.url, status = %status, "Pipeline finished");
                    }
                    Err(e) => {
                        tracing::error!(site = %site.url, error = %e, "Pipeline aborted");
                    }
                }
            });
        }
        tracker.close();

        *guard = Some(Campaign { cancel, tracker });
        Ok(())
    }
}
