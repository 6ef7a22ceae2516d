//! Local Cache Module
//!
//! The process-local tier. Holds one [`CachedEntry`] per key, for any value
//! type, each evicted at the entry's own expiration time, with LRU eviction
//! once the configured capacity is reached.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{CacheStats, CachedEntry, LruTracker};
use crate::clock::SharedClock;

// == Type-Erased Slot ==
/// A stored [`CachedEntry`] with its value type erased.
trait ErasedEntry: Send + Sync {
    fn expiration_time(&self) -> DateTime<Utc>;
    fn mark_checked(&mut self, at: DateTime<Utc>);
    fn as_any(&self) -> &dyn Any;
}

impl<T: Send + Sync + 'static> ErasedEntry for CachedEntry<T> {
    fn expiration_time(&self) -> DateTime<Utc> {
        self.expiration_time
    }

    fn mark_checked(&mut self, at: DateTime<Utc>) {
        CachedEntry::mark_checked(self, at);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// == Local Cache ==
/// Process-local cache of [`CachedEntry`] values.
///
/// Created once per process and handed to every coordinator that should
/// share it. A slot holding a different value type than the one requested
/// reads as a miss.
pub struct LocalCache {
    /// Entries by key
    slots: HashMap<String, Box<dyn ErasedEntry>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Lookup statistics
    stats: CacheStats,
    /// Maximum number of slots
    max_entries: usize,
    /// Time source for expiry checks
    clock: SharedClock,
}

impl fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCache")
            .field("entries", &self.slots.len())
            .field("max_entries", &self.max_entries)
            .field("stats", &self.stats)
            .finish()
    }
}

impl LocalCache {
    // == Constructor ==
    /// Creates an empty local cache.
    ///
    /// # Arguments
    /// * `max_entries` - Capacity before LRU eviction kicks in (at least 1)
    /// * `clock` - Time source used to decide expiry
    pub fn new(max_entries: usize, clock: SharedClock) -> Self {
        Self {
            slots: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            clock,
        }
    }

    // == Get ==
    /// Returns a copy of the live entry stored under `key`.
    ///
    /// Expired slots are dropped on the way and count as misses.
    pub fn get<T>(&mut self, key: &str) -> Option<CachedEntry<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.clock.now();

        let Some(slot) = self.slots.get(key) else {
            self.stats.record_miss();
            return None;
        };

        if now >= slot.expiration_time() {
            debug!(key, "local entry expired");
            self.drop_slot(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        match slot.as_any().downcast_ref::<CachedEntry<T>>() {
            Some(entry) => {
                let entry = entry.clone();
                self.stats.record_hit();
                self.lru.touch(key);
                Some(entry)
            }
            None => {
                debug!(key, "local entry holds a different value type");
                self.stats.record_miss();
                None
            }
        }
    }

    // == Insert ==
    /// Stores `entry` under `key`, replacing any previous slot wholesale.
    ///
    /// When the cache is full and `key` is new, the least recently used slot
    /// is evicted first.
    pub fn insert<T>(&mut self, key: &str, entry: CachedEntry<T>)
    where
        T: Send + Sync + 'static,
    {
        if !self.slots.contains_key(key) && self.slots.len() >= self.max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                debug!(key = %evicted, "evicting least recently used local entry");
                self.slots.remove(&evicted);
                self.stats.record_eviction();
            }
        }

        self.slots.insert(key.to_string(), Box::new(entry));
        self.lru.touch(key);
        self.stats.set_total_entries(self.slots.len());
    }

    // == Mark Checked ==
    /// Records that the remote tier was consulted for `key` at `at` and agreed.
    ///
    /// Returns false if there is no slot for `key`.
    pub fn mark_checked(&mut self, key: &str, at: DateTime<Utc>) -> bool {
        match self.slots.get_mut(key) {
            Some(slot) => {
                slot.mark_checked(at);
                true
            }
            None => false,
        }
    }

    // == Remove ==
    /// Removes the slot for `key`. Returns true if one existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.drop_slot(key)
    }

    // == Cleanup Expired ==
    /// Removes every expired slot and returns how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<String> = self
            .slots
            .iter()
            .filter(|(_, slot)| now >= slot.expiration_time())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.drop_slot(key);
        }

        self.stats.record_expirations(expired.len());
        expired.len()
    }

    /// Current instant on this cache's clock. Entries written into the cache
    /// should be stamped with it.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Checks for a slot without touching LRU order or statistics.
    pub fn contains_key(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.slots.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn drop_slot(&mut self, key: &str) -> bool {
        let existed = self.slots.remove(key).is_some();
        if existed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.slots.len());
        }
        existed
    }
}
