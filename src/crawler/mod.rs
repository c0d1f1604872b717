//! Concurrent site crawler
//!
//! Every discovered URL becomes its own task. A task fetches its page,
//! records the result, claims the unvisited in-scope links it found and
//! spawns one child per claimed link, then waits for its children. The
//! shared visited set is claimed with an atomic insert, so the crawl is a
//! tree over first discovery and no URL is fetched twice.
//!
//! There is no depth or page-count limit; the crawl stops when no task
//! finds a new link. Sites that generate unbounded URL spaces will keep
//! the crawl running until it is cancelled.

pub mod fetcher;
pub mod links;

use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{FetchError, IndexingError};
use crate::models::CrawledPage;

pub use fetcher::{FetchedPage, PageFetcher};
pub use links::SiteScope;

/// Crawl state shared by every task of one crawl
struct CrawlState {
    fetcher: Arc<PageFetcher>,
    scope: SiteScope,
    visited: Mutex<HashSet<String>>,
    pages: Mutex<Vec<CrawledPage>>,
    /// Concurrent fetch limit
    permits: Semaphore,
    politeness_delay: Duration,
    cancel: CancellationToken,
}

impl CrawlState {
    /// Insert `url` into the visited set, returning `false` if already present
    fn claim(&self, url: &str) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.to_string())
    }

    fn record(&self, page: CrawledPage) {
        self.pages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(page);
    }
}

/// Recursive crawler for one site
pub struct SiteCrawler {
    state: Arc<CrawlState>,
}

impl SiteCrawler {
    /// Create a crawler for the site at `site_url`
    pub fn new(
        fetcher: Arc<PageFetcher>,
        site_url: &str,
        workers: usize,
        politeness_delay: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            state: Arc::new(CrawlState {
                fetcher,
                scope: SiteScope::new(site_url),
                visited: Mutex::new(HashSet::new()),
                pages: Mutex::new(Vec::new()),
                permits: Semaphore::new(workers.max(1)),
                politeness_delay,
                cancel,
            }),
        }
    }

    /// Create a crawler using the crawler section of `config`
    pub fn from_config(
        config: &Config,
        fetcher: Arc<PageFetcher>,
        site_url: &str,
        cancel: CancellationToken,
    ) -> Self {
        Self::new(
            fetcher,
            site_url,
            config.workers(),
            config.politeness_delay(),
            cancel,
        )
    }

    /// Crawl everything reachable from `seed`
    ///
    /// Fetch failures become `(url, "", 500)` records and are not expanded.
    ///
    /// # Errors
    ///
    /// Returns `IndexingError::Cancelled` if the crawl's token was
    /// cancelled; pages fetched so far are discarded.
    pub async fn crawl(&self, seed: &str) -> Result<Vec<CrawledPage>, IndexingError> {
        self.state.claim(seed);
        visit(Arc::clone(&self.state), seed.to_string()).await;

        if self.state.cancel.is_cancelled() {
            return Err(IndexingError::Cancelled);
        }

        let pages = std::mem::take(&mut *self.state.pages.lock().unwrap_or_else(|e| e.into_inner()));
        tracing::info!(seed = %seed, pages = pages.len(), "Crawl finished");
        Ok(pages)
    }

    /// Number of URLs claimed so far
    pub fn visited_count(&self) -> usize {
        self.state
            .visited
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

/// Fetch `url`, then fan out to its unvisited links and join them
fn visit(state: Arc<CrawlState>, url: String) -> BoxFuture<'static, ()> {
    async move {
        if state.cancel.is_cancelled() {
            return;
        }

        // Tasks queued on a permit or sleeping out the delay give up on cancel;
        // a fetch already sent runs to completion.
        let fetched = {
            let acquired = tokio::select! {
                biased;
                () = state.cancel.cancelled() => return,
                permit = state.permits.acquire() => permit,
            };
            let Ok(_permit) = acquired else {
                return;
            };
            tokio::select! {
                biased;
                () = state.cancel.cancelled() => return,
                () = tokio::time::sleep(state.politeness_delay) => {}
            }
            state.fetcher.fetch(&url).await
        };

        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                log_fetch_failure(&url, &e);
                state.record(CrawledPage::failed(url));
                return;
            }
        };

        let targets: Vec<String> = links::extract_links(&page.body, &url)
            .into_iter()
            .filter(|target| links::should_follow(target, &url, &state.scope))
            .collect();

        state.record(CrawledPage {
            url: url.clone(),
            content: page.body,
            code: page.status,
        });

        if state.cancel.is_cancelled() {
            return;
        }

        let mut children = JoinSet::new();
        for target in targets {
            if state.claim(&target) {
                children.spawn(visit(Arc::clone(&state), target));
            }
        }

        while let Some(joined) = children.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(parent = %url, error = %e, "Crawl task failed");
            }
        }
    }
    .boxed()
}

fn log_fetch_failure(url: &str, err: &FetchError) {
    if err.is_recoverable() {
        tracing::warn!(url = %url, error = %err, "Fetch failed");
    } else {
        tracing::debug!(url = %url, error = %err, "Page skipped");
    }
}
