// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded LRU cache for rendered template results.
//!
//! Eviction is capacity-driven only; freshness is handled externally by
//! explicit `clear` calls on publish events. Individual operations are
//! atomic, but callers' get-then-put sequences are not: a race costs a
//! redundant recomputation, never corruption, since puts for the same key
//! within one render cycle are idempotent.

use crate::key::CacheKey;
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::warn;

/// Default capacity of the rendered-result cache.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Shared LRU cache from composite keys to rendered byte sequences.
#[derive(Debug)]
pub struct TemplateCache {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    // Insertion order doubles as recency order: front is least recent.
    entries: IndexMap<CacheKey, Vec<u8>>,
    capacity: usize,
}

impl TemplateCache {
    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache bounded to `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: IndexMap::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Look up a rendered result, refreshing its recency on a hit.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<u8>> {
        if Self::reject(key) {
            return None;
        }
        let mut inner = self.inner.lock();
        let value = inner.entries.shift_remove(key)?;
        inner.entries.insert(key.clone(), value.clone());
        Some(value)
    }

    /// Store a rendered result, evicting the least-recently-used entry
    /// when at capacity.
    pub fn put(&self, key: CacheKey, bytes: Vec<u8>) {
        if Self::reject(&key) {
            return;
        }
        let mut inner = self.inner.lock();
        inner.entries.shift_remove(&key);
        if inner.entries.len() >= inner.capacity {
            inner.entries.shift_remove_index(0);
        }
        inner.entries.insert(key, bytes);
    }

    /// True if a result is cached under this key. Does not refresh recency.
    pub fn has(&self, key: &CacheKey) -> bool {
        if Self::reject(key) {
            return false;
        }
        self.inner.lock().entries.contains_key(key)
    }

    /// Drop the entry for one key, if present.
    pub fn clear(&self, key: &CacheKey) {
        self.inner.lock().entries.shift_remove(key);
    }

    /// Drop every entry.
    pub fn clear_all(&self) {
        self.inner.lock().entries.clear();
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    // Degenerate keys would alias unrelated renders; treat them as misses.
    fn reject(key: &CacheKey) -> bool {
        if key.is_degenerate() {
            warn!(%key, "rejecting degenerate cache key");
            true
        } else {
            false
        }
    }
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
