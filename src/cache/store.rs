//! Query cache storage.
//!
//! Holds serialized query results keyed by `QueryKey`, each entry tagged
//! with the collections it depends on. Entries expire after a fixed TTL and
//! can be marked stale in bulk by collection tag; a stale or expired entry
//! is a forced miss and stays in place until the next read overwrites it
//! (last write wins, no population lock).

use std::collections::HashSet;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;
use serde_json::Value;

use crate::domain::types::Collection;

use super::config::CacheConfig;
use super::keys::QueryKey;
use super::lock::{read_guard, write_guard};

struct CacheEntry {
    value: Value,
    tags: HashSet<Collection>,
    expires_at: Instant,
    stale: bool,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        !self.stale && now < self.expires_at
    }
}

/// In-memory query result cache with TTL expiry and tag invalidation.
pub struct QueryCache {
    entries: RwLock<LruCache<QueryKey, CacheEntry>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.entry_limit_non_zero())),
            ttl: config.ttl(),
        }
    }

    /// Look up a fresh entry. Stale or expired entries miss.
    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &QueryKey, now: Instant) -> Option<Value> {
        let mut entries = write_guard(&self.entries, "get");
        match entries.get(key) {
            Some(entry) if entry.is_fresh(now) => {
                counter!("vetrina_cache_hit_total").increment(1);
                Some(entry.value.clone())
            }
            _ => {
                counter!("vetrina_cache_miss_total").increment(1);
                None
            }
        }
    }

    /// Insert or overwrite the entry for a key with a full TTL.
    pub fn set(&self, key: QueryKey, value: Value, tags: HashSet<Collection>) {
        self.set_at(key, value, tags, Instant::now());
    }

    fn set_at(&self, key: QueryKey, value: Value, tags: HashSet<Collection>, now: Instant) {
        let entry = CacheEntry {
            value,
            tags,
            expires_at: now + self.ttl,
            stale: false,
        };
        write_guard(&self.entries, "set").put(key, entry);
    }

    /// Mark every entry that depends on `tag` stale, independent of TTL.
    /// Returns the number of entries newly marked.
    pub fn invalidate(&self, tag: Collection) -> usize {
        let mut entries = write_guard(&self.entries, "invalidate");
        let mut marked = 0;
        for (_, entry) in entries.iter_mut() {
            if !entry.stale && entry.tags.contains(&tag) {
                entry.stale = true;
                marked += 1;
            }
        }
        counter!("vetrina_cache_invalidated_total").increment(marked as u64);
        marked
    }

    /// Drop every entry.
    pub fn clear(&self) {
        write_guard(&self.entries, "clear").clear();
    }

    /// Number of entries, fresh or not.
    pub fn len(&self) -> usize {
        read_guard(&self.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
