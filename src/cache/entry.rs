//! Cached Entry Module
//!
//! Defines the unit of local cache state and the TTL arithmetic that governs
//! how long the local tier holds on to it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

// == TTL Arithmetic ==
/// Returns the local eviction instant for a value written at `now` with the
/// caller's logical `expiry`.
///
/// The local tier always holds a value for twice the logical expiry, so the
/// remote copy (which lives for exactly `expiry`) lapses first and change is
/// detected through token comparison rather than through the local slot
/// timing out. Saturates at the largest representable instant.
pub fn expiration_after(now: DateTime<Utc>, expiry: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(expiry.saturating_mul(2))
        .ok()
        .and_then(|doubled| now.checked_add_signed(doubled))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Generates a fresh sync token for data that did not come from the remote tier.
pub fn new_sync_id() -> String {
    Uuid::new_v4().to_string()
}

// == Cached Entry ==
/// A value held by the local tier together with its coherence metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntry<T> {
    /// The cached value
    pub data: T,
    /// When the local slot is evicted
    pub expiration_time: DateTime<Utc>,
    /// Last time the remote tier was consulted for this key
    pub last_sync_check: DateTime<Utc>,
    /// Version token shared with the remote tier
    pub sync_id: String,
}

impl<T> CachedEntry<T> {
    // == Constructors ==
    /// Creates an entry that has never been checked against the remote tier.
    ///
    /// `last_sync_check` starts at the Unix epoch, so the first lookup that
    /// finds this entry goes to the remote tier.
    ///
    /// # Arguments
    /// * `data` - The value to cache
    /// * `sync_id` - Token identifying this version of the value
    /// * `now` - Write time
    /// * `expiry` - Caller's logical expiry
    pub fn new(data: T, sync_id: impl Into<String>, now: DateTime<Utc>, expiry: Duration) -> Self {
        Self {
            data,
            expiration_time: expiration_after(now, expiry),
            last_sync_check: DateTime::<Utc>::default(),
            sync_id: sync_id.into(),
        }
    }

    /// Creates an entry whose token was just confirmed against the remote tier.
    pub fn synced(data: T, sync_id: impl Into<String>, now: DateTime<Utc>, expiry: Duration) -> Self {
        Self {
            last_sync_check: now,
            ..Self::new(data, sync_id, now, expiry)
        }
    }

    /// Creates an entry for data produced by the fallback, with a fresh token.
    pub fn from_fallback(data: T, now: DateTime<Utc>, expiry: Duration) -> Self {
        Self::synced(data, new_sync_id(), now, expiry)
    }

    // == Expiry ==
    /// Checks if the local slot has expired.
    ///
    /// Expired once `now` reaches `expiration_time`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration_time
    }

    // == Sync Gating ==
    /// Returns true when at least `interval` has passed since the last
    /// remote check, so the remote tier must be consulted again.
    pub fn needs_sync_check(&self, now: DateTime<Utc>, interval: chrono::Duration) -> bool {
        now.signed_duration_since(self.last_sync_check) >= interval
    }

    /// Records a remote check that found the tiers in agreement.
    ///
    /// Leaves `expiration_time` untouched.
    pub fn mark_checked(&mut self, at: DateTime<Utc>) {
        self.last_sync_check = at;
    }
}
