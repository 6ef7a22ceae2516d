//! Remote Module
//!
//! Clients for the shared (remote) tier and the two layouts in which the
//! coordinator keeps a sync token and payload there.
//!
//! # Clients
//! - [`InMemoryRemote`] - a [`SharedStore`](crate::store::SharedStore) in this process
//! - [`HttpRemote`] - the shared tier server over HTTP
//!
//! # Layouts
//! - [`HashRepresentation`] - one hash per key with `syncId` and `data` fields
//! - [`SplitKeyRepresentation`] - `Sync_{key}` and `Data_{key}` string keys

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

mod http;
mod memory;
mod representation;

pub use http::HttpRemote;
pub use memory::InMemoryRemote;
pub use representation::{
    representation_for, HashRepresentation, RemoteLayout, RemoteRepresentation, RemoteVersion,
    SplitKeyRepresentation, DATA_FIELD, DATA_PREFIX, MAX_SPLIT_KEY_LENGTH, SYNC_FIELD,
    SYNC_PREFIX,
};

// == Remote Store ==
/// Primitive get/set operations against the shared tier.
///
/// Implementations never fail outward: a transport or server error is
/// logged and reported as an empty result (reads) or `false` (writes).
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns all fields of the hash at `key`, empty when absent.
    async fn get_hash(&self, key: &str) -> HashMap<String, String>;

    /// Sets fields of the hash at `key` and gives the key a TTL of `ttl`.
    async fn set_hash(&self, key: &str, fields: &[(&str, &str)], ttl: Duration) -> bool;

    /// Returns the string at `key`, None when absent.
    async fn get_string(&self, key: &str) -> Option<String>;

    /// Stores the string at `key` with a TTL of `ttl`.
    async fn set_string(&self, key: &str, value: &str, ttl: Duration) -> bool;

    /// Deletes `key`. Returns false when nothing was deleted.
    async fn delete(&self, key: &str) -> bool;
}

/// Converts a TTL to whole seconds for the shared tier, rounding up so a
/// sub-second TTL still produces a live key.
pub fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}
