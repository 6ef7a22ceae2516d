//! In-Memory Remote Module
//!
//! A [`RemoteStore`] over a [`SharedStore`] living in this process. Clones
//! share the same store, so several coordinators built on clones behave like
//! separate processes talking to one shared tier.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use super::{ttl_seconds, RemoteStore};
use crate::error::StoreError;
use crate::store::SharedStore;

// == In-Memory Remote ==
/// Shared tier client backed by an in-process [`SharedStore`].
#[derive(Debug, Clone)]
pub struct InMemoryRemote {
    store: Arc<RwLock<SharedStore>>,
}

impl InMemoryRemote {
    /// Creates a client over a new, empty store.
    ///
    /// # Arguments
    /// * `max_entries` - Capacity of the store
    /// * `default_ttl` - TTL in seconds for writes without one
    pub fn new(max_entries: usize, default_ttl: u64) -> Self {
        Self::from_shared(Arc::new(RwLock::new(SharedStore::new(max_entries, default_ttl))))
    }

    /// Creates a client over an existing store.
    pub fn from_shared(store: Arc<RwLock<SharedStore>>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    pub fn shared(&self) -> Arc<RwLock<SharedStore>> {
        Arc::clone(&self.store)
    }
}

/// Logs anything beyond a plain miss.
fn report(op: &str, key: &str, err: &StoreError) {
    match err {
        StoreError::NotFound(_) | StoreError::Expired(_) => {}
        other => warn!(op, key, error = %other, "shared store rejected operation"),
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn get_hash(&self, key: &str) -> HashMap<String, String> {
        match self.store.write().await.get_hash(key) {
            Ok(fields) => fields.into_iter().collect(),
            Err(err) => {
                report("get_hash", key, &err);
                HashMap::new()
            }
        }
    }

    async fn set_hash(&self, key: &str, fields: &[(&str, &str)], ttl: Duration) -> bool {
        let fields = fields
            .iter()
            .map(|(field, value)| (field.to_string(), value.to_string()))
            .collect();

        self.store
            .write()
            .await
            .set_hash(key.to_string(), fields, Some(ttl_seconds(ttl)))
            .map_err(|err| report("set_hash", key, &err))
            .is_ok()
    }

    async fn get_string(&self, key: &str) -> Option<String> {
        self.store
            .write()
            .await
            .get_string(key)
            .map_err(|err| report("get_string", key, &err))
            .ok()
    }

    async fn set_string(&self, key: &str, value: &str, ttl: Duration) -> bool {
        self.store
            .write()
            .await
            .set_string(key.to_string(), value.to_string(), Some(ttl_seconds(ttl)))
            .map_err(|err| report("set_string", key, &err))
            .is_ok()
    }

    async fn delete(&self, key: &str) -> bool {
        self.store
            .write()
            .await
            .delete(key)
            .map_err(|err| report("delete", key, &err))
            .is_ok()
    }
}
