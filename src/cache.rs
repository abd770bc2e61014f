use crate::types::PinnedRepo;
use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_CAPACITY: usize = 500;

pub type SharedRepoCache = Arc<Mutex<RepoCache>>;

/// Last successful fetch for one username.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub repos: Vec<PinnedRepo>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Username -> pinned repositories, bounded by a least-recently-used policy.
/// Entries carry no expiry of their own.
pub struct RepoCache {
    lru: LruCache<String, CacheEntry>,
    hits: u64,
    misses: u64,
}

impl RepoCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            lru: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn shared(capacity: usize) -> SharedRepoCache {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Looks up `username`, marking it as most recently used.
    pub fn get(&mut self, username: &str) -> Option<CacheEntry> {
        match self.lru.get(username) {
            Some(entry) => {
                self.hits += 1;
                Some(entry.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Looks up `username` without touching recency or the counters.
    pub fn peek(&self, username: &str) -> Option<&CacheEntry> {
        self.lru.peek(username)
    }

    /// Replaces the entry for `username` wholesale, evicting the least
    /// recently used username if the cache is full.
    pub fn put(&mut self, username: String, repos: Vec<PinnedRepo>) {
        let entry = CacheEntry {
            repos,
            fetched_at: Utc::now(),
        };
        self.lru.put(username, entry);
    }

    pub fn contains(&self, username: &str) -> bool {
        self.lru.contains(username)
    }

    pub fn len(&self) -> usize {
        self.lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.lru.len(),
            capacity: self.lru.cap().get(),
            hits: self.hits,
            misses: self.misses,
        }
    }
}
