use crate::cache::SharedRepoCache;
use crate::error::{PinnedReposError, Result};
use crate::extractor::RepoSource;
use ractor::{Actor, ActorProcessingErr, ActorRef};
use serde::Serialize;
use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub enum RefreshMessage {
    /// Re-fetch a username and overwrite its cache entry on success.
    Refresh(String),
    /// Sent back by a refresh task once it has finished.
    Finished(String),
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStats {
    pub requested: u64,
    pub skipped: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub in_flight: u64,
}

/// Counters shared between the worker, its tasks and readers such as the
/// health endpoint. Reading them never goes through the mailbox.
#[derive(Debug, Default)]
pub struct RefreshCounters {
    requested: AtomicU64,
    skipped: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    in_flight: AtomicU64,
}

impl RefreshCounters {
    pub fn snapshot(&self) -> RefreshStats {
        RefreshStats {
            requested: self.requested.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
        }
    }
}

/// Background side of stale-while-revalidate. Every accepted refresh runs as
/// its own detached task, so a slow username never delays another one. At
/// most one refresh per username is pending; further requests for it are
/// dropped until it finishes.
pub struct RefreshWorker<S> {
    _source: PhantomData<fn() -> S>,
}

pub struct RefreshWorkerArgs<S> {
    pub source: Arc<S>,
    pub cache: SharedRepoCache,
    pub counters: Arc<RefreshCounters>,
}

pub struct RefreshWorkerState<S> {
    source: Arc<S>,
    cache: SharedRepoCache,
    counters: Arc<RefreshCounters>,
    pending: HashSet<String>,
}

impl<S: RepoSource> RefreshWorker<S> {
    pub fn new() -> Self {
        Self {
            _source: PhantomData,
        }
    }

    pub async fn spawn(args: RefreshWorkerArgs<S>) -> Result<ActorRef<RefreshMessage>> {
        match Actor::spawn(None, Self::new(), args).await {
            Ok((actor_ref, _handle)) => {
                info!("Refresh worker spawned");
                Ok(actor_ref)
            }
            Err(spawn_err) => {
                error!("Failed to spawn refresh worker: {:?}", spawn_err);
                Err(PinnedReposError::ActorError(format!("Failed to spawn refresh worker: {}", spawn_err)))
            }
        }
    }
}

impl<S: RepoSource> Default for RefreshWorker<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[ractor::async_trait]
impl<S: RepoSource> Actor for RefreshWorker<S> {
    type Msg = RefreshMessage;
    type State = RefreshWorkerState<S>;
    type Arguments = RefreshWorkerArgs<S>;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: Self::Arguments,
    ) -> std::result::Result<Self::State, ActorProcessingErr> {
        Ok(RefreshWorkerState {
            source: args.source,
            cache: args.cache,
            counters: args.counters,
            pending: HashSet::new(),
        })
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> std::result::Result<(), ActorProcessingErr> {
        match message {
            RefreshMessage::Refresh(username) => {
                state.counters.requested.fetch_add(1, Ordering::Relaxed);

                if !state.pending.insert(username.clone()) {
                    state.counters.skipped.fetch_add(1, Ordering::Relaxed);
                    debug!(username = %username, "Refresh already pending, skipping");
                    return Ok(());
                }

                state.counters.in_flight.fetch_add(1, Ordering::Relaxed);
                tokio::spawn(run_refresh(
                    username,
                    state.source.clone(),
                    state.cache.clone(),
                    state.counters.clone(),
                    myself,
                ));
            }
            RefreshMessage::Finished(username) => {
                state.pending.remove(&username);
            }
        }

        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> std::result::Result<(), ActorProcessingErr> {
        let stats = state.counters.snapshot();
        info!(
            requested = stats.requested,
            succeeded = stats.succeeded,
            failed = stats.failed,
            in_flight = stats.in_flight,
            "Refresh worker stopped"
        );
        Ok(())
    }
}

async fn run_refresh<S: RepoSource>(
    username: String,
    source: Arc<S>,
    cache: SharedRepoCache,
    counters: Arc<RefreshCounters>,
    worker: ActorRef<RefreshMessage>,
) {
    debug!(username = %username, "Background refresh started");

    match source.pinned_repos(&username).await {
        Ok(repos) => {
            let count = repos.len();
            cache.lock().await.put(username.clone(), repos);
            counters.succeeded.fetch_add(1, Ordering::Relaxed);
            debug!(username = %username, repos = count, "Background refresh stored");
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(username = %username, error = %e, "Background refresh failed, keeping cached value");
        }
    }

    counters.in_flight.fetch_sub(1, Ordering::Relaxed);
    if worker.cast(RefreshMessage::Finished(username)).is_err() {
        debug!("Refresh worker stopped before the refresh finished");
    }
}
