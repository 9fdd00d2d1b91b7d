//! Poison recovery for the query cache's interior lock.
//!
//! A panic while the lock is held can leave entries half-written. Recovered
//! state is at worst stale, and stale entries are already a handled case
//! for this cache, so recovery beats propagating the poison.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub(crate) fn read_guard<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!(op, access = "read", "Query cache lock poisoned; recovering");
        poisoned.into_inner()
    })
}

pub(crate) fn write_guard<'a, T>(lock: &'a RwLock<T>, op: &'static str) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!(op, access = "write", "Query cache lock poisoned; recovering");
        poisoned.into_inner()
    })
}
