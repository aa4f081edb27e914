//! In-process word detail cache with TTL expiry and LRU eviction.
//!
//! Keyed by catalog slug. Entries expire after a configurable TTL (7 days by
//! default) and are evicted least-recently-used when the map reaches capacity.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::details::WordDetails;

/// A single cached detail.
#[derive(Debug, Clone)]
struct CacheEntry {
    details: WordDetails,
    /// Unix timestamp when the entry was created.
    created_at: u64,
    /// Unix timestamp when the entry was last accessed.
    accessed_at: u64,
    hit_count: u32,
}

/// Word detail cache with TTL expiry and LRU eviction.
#[derive(Debug)]
pub struct DetailCache {
    entries: HashMap<String, CacheEntry>,
    ttl_secs: u64,
    max_entries: usize,
}

impl DetailCache {
    /// Create a new cache. `max_entries` is clamped to a minimum of 1.
    pub fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_secs,
            max_entries: max_entries.max(1),
        }
    }

    /// Look up a slug. Returns `None` if absent or expired.
    pub fn get(&mut self, slug: &str) -> Option<WordDetails> {
        let now = Self::now_secs();
        let expired = self
            .entries
            .get(slug)
            .map(|e| now.saturating_sub(e.created_at) > self.ttl_secs)?;
        if expired {
            debug!(slug, "Detail cache entry expired, removing");
            self.entries.remove(slug);
            return None;
        }
        let entry = self.entries.get_mut(slug)?;
        entry.accessed_at = now;
        entry.hit_count = entry.hit_count.saturating_add(1);
        Some(entry.details.clone())
    }

    /// Store details for a slug, evicting expired then LRU entries as needed.
    pub fn put(&mut self, slug: impl Into<String>, details: WordDetails) {
        let slug = slug.into();
        let now = Self::now_secs();
        self.evict_expired(now);
        if !self.entries.contains_key(&slug) {
            while self.entries.len() >= self.max_entries {
                self.evict_lru();
            }
        }
        self.entries.insert(
            slug,
            CacheEntry {
                details,
                created_at: now,
                accessed_at: now,
                hit_count: 0,
            },
        );
    }

    /// Drop one slug. Returns whether it was present.
    pub fn remove(&mut self, slug: &str) -> bool {
        self.entries.remove(slug).is_some()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            total_hits: self.entries.values().map(|e| u64::from(e.hit_count)).sum(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_expired(&mut self, now: u64) {
        let ttl = self.ttl_secs;
        self.entries
            .retain(|_, e| now.saturating_sub(e.created_at) <= ttl);
    }

    fn evict_lru(&mut self) {
        if let Some(lru) = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.accessed_at)
            .map(|(k, _)| k.clone())
        {
            debug!(slug = %lru, "Evicting LRU detail cache entry");
            self.entries.remove(&lru);
        }
    }

    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Aggregate cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    /// Cumulative hits across live entries.
    pub total_hits: u64,
}
