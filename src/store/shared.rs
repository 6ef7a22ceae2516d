//! Shared Store Module
//!
//! The remote tier's storage engine: string and hash values with TTL expiry
//! and LRU eviction. Served over HTTP by the binary, or used in-process
//! through [`InMemoryRemote`](crate::remote::InMemoryRemote).

use std::collections::{BTreeMap, HashMap};

use crate::cache::{CacheStats, LruTracker};
use crate::clock::{system_clock, SharedClock};
use crate::error::{Result, StoreError};
use crate::store::{StoredEntry, StoredValue, MAX_KEY_LENGTH, MAX_VALUE_SIZE};

// == Shared Store ==
/// Keyed store of [`StoredValue`]s.
#[derive(Debug)]
pub struct SharedStore {
    /// Values by key
    entries: HashMap<String, StoredEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// Lookup statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// TTL in seconds for writes that do not carry one
    default_ttl: u64,
    /// Time source
    clock: SharedClock,
}

impl SharedStore {
    // == Constructors ==
    /// Creates a store on the system clock.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the store can hold
    /// * `default_ttl` - TTL in seconds for writes without an explicit TTL
    pub fn new(max_entries: usize, default_ttl: u64) -> Self {
        Self::with_clock(max_entries, default_ttl, system_clock())
    }

    /// Creates a store on the given clock.
    pub fn with_clock(max_entries: usize, default_ttl: u64, clock: SharedClock) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
            clock,
        }
    }

    // == String Operations ==
    /// Stores a string under `key`, replacing whatever was there.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The string to store
    /// * `ttl` - TTL in seconds (default TTL when None)
    pub fn set_string(&mut self, key: String, value: String, ttl: Option<u64>) -> Result<()> {
        self.write(key, StoredValue::Text(value), ttl)
    }

    /// Returns the string stored under `key`.
    pub fn get_string(&mut self, key: &str) -> Result<String> {
        match self.read(key)? {
            StoredValue::Text(text) => Ok(text),
            other => Err(StoreError::WrongType {
                key: key.to_string(),
                actual: other.kind(),
            }),
        }
    }

    // == Hash Operations ==
    /// Sets fields of the hash stored under `key` and resets its TTL.
    ///
    /// Fields already present and not named in `fields` are kept. A missing
    /// or expired key starts a new hash.
    pub fn set_hash(
        &mut self,
        key: String,
        fields: BTreeMap<String, String>,
        ttl: Option<u64>,
    ) -> Result<()> {
        let now = self.clock.now();
        let mut merged = match self.entries.get(&key) {
            Some(entry) if !entry.is_expired(now) => match &entry.value {
                StoredValue::Hash(existing) => existing.clone(),
                other => {
                    return Err(StoreError::WrongType {
                        key,
                        actual: other.kind(),
                    })
                }
            },
            _ => BTreeMap::new(),
        };
        merged.extend(fields);

        self.write(key, StoredValue::Hash(merged), ttl)
    }

    /// Returns all fields of the hash stored under `key`.
    ///
    /// A missing or expired key yields an empty map.
    pub fn get_hash(&mut self, key: &str) -> Result<BTreeMap<String, String>> {
        match self.read(key) {
            Ok(StoredValue::Hash(fields)) => Ok(fields),
            Ok(other) => Err(StoreError::WrongType {
                key: key.to_string(),
                actual: other.kind(),
            }),
            Err(StoreError::NotFound(_)) | Err(StoreError::Expired(_)) => Ok(BTreeMap::new()),
            Err(err) => Err(err),
        }
    }

    // == Delete ==
    /// Removes `key`, whatever its type.
    pub fn delete(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
            Ok(())
        } else {
            Err(StoreError::NotFound(key.to_string()))
        }
    }

    // == Stats ==
    /// Returns current statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired.len());
        self.stats.set_total_entries(self.entries.len());
        expired.len()
    }

    /// Remaining TTL of `key` in seconds, if it is live and has one.
    pub fn ttl_remaining(&self, key: &str) -> Option<u64> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.ttl_remaining(now))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Internals ==
    fn write(&mut self, key: String, value: StoredValue, ttl: Option<u64>) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidRequest("Key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(StoreError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if value.size() > MAX_VALUE_SIZE {
            return Err(StoreError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
                None => {
                    return Err(StoreError::StoreFull(
                        "Store is full and eviction failed".to_string(),
                    ))
                }
            }
        }

        let now = self.clock.now();
        let entry = StoredEntry::new(value, now, Some(ttl.unwrap_or(self.default_ttl)));
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    fn read(&mut self, key: &str) -> Result<StoredValue> {
        let now = self.clock.now();

        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return Err(StoreError::NotFound(key.to_string()));
        };

        if entry.is_expired(now) {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            self.stats.record_miss();
            return Err(StoreError::Expired(key.to_string()));
        }

        let value = entry.value.clone();
        self.stats.record_hit();
        self.lru.touch(key);
        Ok(value)
    }
}
