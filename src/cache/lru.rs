//! LRU Tracker Module
//!
//! Least-recently-used bookkeeping shared by the local tier and the shared store.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Every touch stamps the key with a monotonically increasing generation.
/// The smallest generation is the least recently used key.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Generation of the last touch, per key
    generations: HashMap<String, u64>,
    /// Keys ordered by generation (oldest first)
    order: BTreeMap<u64, String>,
    /// Next generation to hand out
    next: u64,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &str) {
        let generation = self.next;
        self.next += 1;

        if let Some(previous) = self.generations.insert(key.to_string(), generation) {
            self.order.remove(&previous);
        }
        self.order.insert(generation, key.to_string());
    }

    // == Remove ==
    /// Stops tracking a key.
    pub fn remove(&mut self, key: &str) {
        if let Some(generation) = self.generations.remove(key) {
            self.order.remove(&generation);
        }
    }

    // == Evict Oldest ==
    /// Returns and forgets the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.generations.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.values().next().map(String::as_str)
    }

    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.generations.contains_key(key)
    }
}
