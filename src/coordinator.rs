use crate::actors::{RefreshCounters, RefreshMessage, RefreshStats, RefreshWorker, RefreshWorkerArgs};
use crate::cache::{CacheStats, RepoCache, SharedRepoCache};
use crate::error::Result;
use crate::extractor::RepoSource;
use crate::types::PinnedRepo;
use chrono::Utc;
use ractor::{ActorRef, ActorStatus};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Serves pinned repositories stale-while-revalidate.
///
/// Owns the cache and the refresh worker for the lifetime of the process.
/// Concurrent misses for the same username each fetch upstream; only
/// background refreshes are de-duplicated.
pub struct Coordinator<S> {
    source: Arc<S>,
    cache: SharedRepoCache,
    refresher: ActorRef<RefreshMessage>,
    refresh_counters: Arc<RefreshCounters>,
}

impl<S: RepoSource> Coordinator<S> {
    pub async fn spawn(source: Arc<S>, cache_capacity: usize) -> Result<Self> {
        let cache = RepoCache::shared(cache_capacity);
        let refresh_counters = Arc::new(RefreshCounters::default());
        let refresher = RefreshWorker::spawn(RefreshWorkerArgs {
            source: source.clone(),
            cache: cache.clone(),
            counters: refresh_counters.clone(),
        })
        .await?;

        info!(cache_capacity, "Coordinator ready");
        Ok(Self {
            source,
            cache,
            refresher,
            refresh_counters,
        })
    }

    /// Returns the pinned repositories of `username`.
    ///
    /// A cached value is returned as is and a background refresh is queued.
    /// On a miss, or when `force_refresh` is set, upstream is fetched inline;
    /// a failed fetch is returned to the caller and leaves the cache alone.
    pub async fn resolve(&self, username: &str, force_refresh: bool) -> Result<Vec<PinnedRepo>> {
        if !force_refresh {
            let cached = self.cache.lock().await.get(username);
            if let Some(entry) = cached {
                let age = Utc::now() - entry.fetched_at;
                debug!(username, age_seconds = age.num_seconds(), "Serving cached repositories");
                self.schedule_refresh(username);
                return Ok(entry.repos);
            }
        }

        let repos = self.source.pinned_repos(username).await?;
        self.cache.lock().await.put(username.to_string(), repos.clone());
        debug!(username, repos = repos.len(), force_refresh, "Fetched and cached repositories");

        Ok(repos)
    }

    fn schedule_refresh(&self, username: &str) {
        if let Err(e) = self.refresher.cast(RefreshMessage::Refresh(username.to_string())) {
            warn!(username, "Failed to queue background refresh: {}", e);
        }
    }

    pub fn cache(&self) -> &SharedRepoCache {
        &self.cache
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.lock().await.stats()
    }

    pub fn refresh_stats(&self) -> RefreshStats {
        self.refresh_counters.snapshot()
    }

    /// Whether the refresh worker is still accepting requests.
    pub fn refresher_running(&self) -> bool {
        matches!(self.refresher.get_status(), ActorStatus::Running)
    }

    pub fn shutdown(&self) {
        self.refresher.stop(Some("shutdown".to_string()));
    }
}
