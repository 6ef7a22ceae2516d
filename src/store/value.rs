//! Stored Value Module
//!
//! Values held by the shared store and their TTL metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

// == Stored Value ==
/// A value in the shared store: a plain string or a field map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    Text(String),
    Hash(BTreeMap<String, String>),
}

impl StoredValue {
    /// Payload size in bytes, used for the value size limit.
    pub fn size(&self) -> usize {
        match self {
            StoredValue::Text(text) => text.len(),
            StoredValue::Hash(fields) => fields.iter().map(|(k, v)| k.len() + v.len()).sum(),
        }
    }

    /// Type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            StoredValue::Text(_) => "string",
            StoredValue::Hash(_) => "hash",
        }
    }
}

// == Stored Entry ==
/// A stored value with creation and expiry instants.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub value: StoredValue,
    pub created_at: DateTime<Utc>,
    /// None = never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    /// Creates an entry written at `now` that expires after `ttl_seconds`.
    pub fn new(value: StoredValue, now: DateTime<Utc>, ttl_seconds: Option<u64>) -> Self {
        let expires_at = ttl_seconds.map(|ttl| {
            i64::try_from(ttl)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .and_then(|ttl| now.checked_add_signed(ttl))
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    /// Expired once `now` reaches `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }

    /// Remaining TTL in seconds, partial seconds rounded up.
    /// `Some(0)` once expired, None without TTL.
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> Option<u64> {
        self.expires_at.map(|expires| {
            let millis = u64::try_from((expires - now).num_milliseconds()).unwrap_or(0);
            millis.div_ceil(1000)
        })
    }
}
