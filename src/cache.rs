//! Single-slot query result cache
//!
//! Holds the assembled result of the most recent cache-missing query. A lookup
//! hits only when the rounded window and level match exactly and the entry is
//! younger than the freshness threshold. Appends never invalidate the slot, so a
//! hit may miss entries written after it was captured.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::bucket::BucketId;
use crate::entry::Severity;
use crate::query::SortOrder;

/// A stored line together with its decoded timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedLine {
    pub timestamp: DateTime<Utc>,
    pub raw: String,
}

/// Key a cached result is valid for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub from_bucket: BucketId,
    pub until_bucket: BucketId,
    pub level: Severity,
}

/// The cached result of one query
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub captured_at: DateTime<Utc>,
    pub key: CacheKey,
    pub order: SortOrder,
    pub data: Arc<Vec<CachedLine>>,
}

impl CacheEntry {
    /// Iterate the cached lines in the requested order
    ///
    /// A differing order reverses the whole sequence end to end. Nothing is re-sorted.
    pub fn lines_in(&self, order: SortOrder) -> Box<dyn Iterator<Item = &CachedLine> + '_> {
        if order == self.order {
            Box::new(self.data.iter())
        } else {
            Box::new(self.data.iter().rev())
        }
    }
}

/// Process-wide single-slot cache
#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    slot: RwLock<Option<CacheEntry>>,
}

impl ResultCache {
    /// Create an empty cache with the given freshness threshold
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Get the cached entry if it matches `key` and is still fresh at `now`
    pub fn lookup(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<CacheEntry> {
        let slot = self.slot.read();
        slot.as_ref()
            .filter(|entry| entry.key == *key && now - entry.captured_at < self.ttl)
            .cloned()
    }

    /// Replace the slot with a new entry
    pub fn store(&self, entry: CacheEntry) {
        *self.slot.write() = Some(entry);
    }

    /// Drop the cached entry
    pub fn clear(&self) {
        *self.slot.write() = None;
    }
}
