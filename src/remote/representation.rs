//! Remote Representation Module
//!
//! How a sync token and its JSON payload are laid out in the shared tier.
//! Both layouts expose the same capability to the coordinator, so the
//! coherence algorithm is written once.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::RemoteStore;
use crate::store::MAX_KEY_LENGTH;

// == Layout Constants ==
/// Hash field holding the sync token
pub const SYNC_FIELD: &str = "syncId";
/// Hash field holding the JSON payload
pub const DATA_FIELD: &str = "data";
/// Key prefix of the token key in the split layout
pub const SYNC_PREFIX: &str = "Sync_";
/// Key prefix of the payload key in the split layout
pub const DATA_PREFIX: &str = "Data_";
/// Longest cache key the split layout can store once prefixed
pub const MAX_SPLIT_KEY_LENGTH: usize = MAX_KEY_LENGTH - SYNC_PREFIX.len();

// == Remote Layout ==
/// Selects a representation at deployment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteLayout {
    /// One hash per key
    #[default]
    Hash,
    /// Separate token and payload string keys
    Split,
}

impl FromStr for RemoteLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hash" => Ok(RemoteLayout::Hash),
            "split" => Ok(RemoteLayout::Split),
            other => Err(format!("unknown remote layout '{}', expected 'hash' or 'split'", other)),
        }
    }
}

impl fmt::Display for RemoteLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteLayout::Hash => f.write_str("hash"),
            RemoteLayout::Split => f.write_str("split"),
        }
    }
}

// == Remote Version ==
/// What a remote check found: the current token, and the payload when the
/// layout returned it in the same round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteVersion {
    token: String,
    payload: Option<String>,
}

impl RemoteVersion {
    /// A token whose payload still has to be fetched.
    pub fn token_only(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            payload: None,
        }
    }

    /// A token fetched together with its payload.
    pub fn with_payload(token: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            payload: Some(payload.into()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn into_token(self) -> String {
        self.token
    }
}

// == Remote Representation ==
/// Token + payload capability over a [`RemoteStore`].
#[async_trait]
pub trait RemoteRepresentation: Send + Sync {
    /// Which layout this is.
    fn layout(&self) -> RemoteLayout;

    /// Looks up the current token for `key`.
    ///
    /// Returns None when the shared tier has no usable record.
    async fn check(&self, key: &str) -> Option<RemoteVersion>;

    /// Returns the payload belonging to `version`, fetching it if the check
    /// did not already bring it along. None when missing or blank.
    async fn load_payload(&self, key: &str, version: &RemoteVersion) -> Option<String>;

    /// Writes `token` and `payload` for `key`, both living for `ttl`.
    async fn publish(&self, key: &str, token: &str, payload: &str, ttl: Duration) -> bool;

    /// Deletes everything stored for `key`.
    async fn purge(&self, key: &str);
}

#[async_trait]
impl<R: RemoteRepresentation + ?Sized> RemoteRepresentation for Box<R> {
    fn layout(&self) -> RemoteLayout {
        (**self).layout()
    }

    async fn check(&self, key: &str) -> Option<RemoteVersion> {
        (**self).check(key).await
    }

    async fn load_payload(&self, key: &str, version: &RemoteVersion) -> Option<String> {
        (**self).load_payload(key, version).await
    }

    async fn publish(&self, key: &str, token: &str, payload: &str, ttl: Duration) -> bool {
        (**self).publish(key, token, payload, ttl).await
    }

    async fn purge(&self, key: &str) {
        (**self).purge(key).await
    }
}

#[async_trait]
impl<R: RemoteRepresentation + ?Sized> RemoteRepresentation for Arc<R> {
    fn layout(&self) -> RemoteLayout {
        (**self).layout()
    }

    async fn check(&self, key: &str) -> Option<RemoteVersion> {
        (**self).check(key).await
    }

    async fn load_payload(&self, key: &str, version: &RemoteVersion) -> Option<String> {
        (**self).load_payload(key, version).await
    }

    async fn publish(&self, key: &str, token: &str, payload: &str, ttl: Duration) -> bool {
        (**self).publish(key, token, payload, ttl).await
    }

    async fn purge(&self, key: &str) {
        (**self).purge(key).await
    }
}

/// Builds the representation named by `layout` over `store`.
pub fn representation_for<S>(layout: RemoteLayout, store: S) -> Box<dyn RemoteRepresentation>
where
    S: RemoteStore + 'static,
{
    match layout {
        RemoteLayout::Hash => Box::new(HashRepresentation::new(store)),
        RemoteLayout::Split => Box::new(SplitKeyRepresentation::new(store)),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// == Hash Layout ==
/// One hash per key holding [`SYNC_FIELD`] and [`DATA_FIELD`].
///
/// A single round trip returns both token and payload, and a single write
/// replaces both.
#[derive(Debug, Clone)]
pub struct HashRepresentation<S> {
    store: S,
}

impl<S: RemoteStore> HashRepresentation<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: RemoteStore> RemoteRepresentation for HashRepresentation<S> {
    fn layout(&self) -> RemoteLayout {
        RemoteLayout::Hash
    }

    async fn check(&self, key: &str) -> Option<RemoteVersion> {
        let mut fields = self.store.get_hash(key).await;

        // A usable record carries both fields
        if fields.len() < 2 {
            return None;
        }

        let token = non_blank(fields.remove(SYNC_FIELD))?;
        Some(match fields.remove(DATA_FIELD) {
            Some(payload) => RemoteVersion::with_payload(token, payload),
            None => RemoteVersion::token_only(token),
        })
    }

    async fn load_payload(&self, _key: &str, version: &RemoteVersion) -> Option<String> {
        non_blank(version.payload.clone())
    }

    async fn publish(&self, key: &str, token: &str, payload: &str, ttl: Duration) -> bool {
        let written = self
            .store
            .set_hash(key, &[(SYNC_FIELD, token), (DATA_FIELD, payload)], ttl)
            .await;
        if !written {
            warn!(key, "could not publish hash record to the shared tier");
        }
        written
    }

    async fn purge(&self, key: &str) {
        self.store.delete(key).await;
    }
}

// == Split Key Layout ==
/// Token under `Sync_{key}`, payload under `Data_{key}`.
///
/// The two keys are read and written independently; a token without a
/// payload reads as a corrupt record. The payload is always written before
/// its token, so a reader that sees a token finds that token's payload or
/// none at all.
///
/// Keys longer than [`MAX_SPLIT_KEY_LENGTH`] are never stored: they read as
/// no record and publishing them fails without a round trip.
#[derive(Debug, Clone)]
pub struct SplitKeyRepresentation<S> {
    store: S,
}

impl<S: RemoteStore> SplitKeyRepresentation<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Key holding the token for `key`.
    pub fn sync_key(key: &str) -> String {
        format!("{}{}", SYNC_PREFIX, key)
    }

    /// Key holding the payload for `key`.
    pub fn data_key(key: &str) -> String {
        format!("{}{}", DATA_PREFIX, key)
    }

    fn fits(key: &str) -> bool {
        key.len() <= MAX_SPLIT_KEY_LENGTH
    }
}

#[async_trait]
impl<S: RemoteStore> RemoteRepresentation for SplitKeyRepresentation<S> {
    fn layout(&self) -> RemoteLayout {
        RemoteLayout::Split
    }

    async fn check(&self, key: &str) -> Option<RemoteVersion> {
        if !Self::fits(key) {
            return None;
        }
        let token = non_blank(self.store.get_string(&Self::sync_key(key)).await)?;
        Some(RemoteVersion::token_only(token))
    }

    async fn load_payload(&self, key: &str, version: &RemoteVersion) -> Option<String> {
        match &version.payload {
            Some(payload) => non_blank(Some(payload.clone())),
            None => non_blank(self.store.get_string(&Self::data_key(key)).await),
        }
    }

    async fn publish(&self, key: &str, token: &str, payload: &str, ttl: Duration) -> bool {
        if !Self::fits(key) {
            warn!(
                key_length = key.len(),
                max = MAX_SPLIT_KEY_LENGTH,
                "key too long for the split layout, not publishing"
            );
            return false;
        }

        let data_written = self.store.set_string(&Self::data_key(key), payload, ttl).await;
        if !data_written {
            warn!(key, "could not publish split payload to the shared tier");
            return false;
        }

        let token_written = self.store.set_string(&Self::sync_key(key), token, ttl).await;
        if !token_written {
            warn!(key, "could not publish split token to the shared tier");
        }
        token_written
    }

    async fn purge(&self, key: &str) {
        self.store.delete(&Self::sync_key(key)).await;
        self.store.delete(&Self::data_key(key)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryRemote;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const TTL: Duration = Duration::from_secs(60);

    /// Records what a reader of `k` would see after every string write.
    struct ReaderView {
        inner: InMemoryRemote,
        views: Mutex<Vec<(Option<String>, Option<String>)>>,
    }

    #[async_trait]
    impl RemoteStore for ReaderView {
        async fn get_hash(&self, key: &str) -> HashMap<String, String> {
            self.inner.get_hash(key).await
        }

        async fn set_hash(&self, key: &str, fields: &[(&str, &str)], ttl: Duration) -> bool {
            self.inner.set_hash(key, fields, ttl).await
        }

        async fn get_string(&self, key: &str) -> Option<String> {
            self.inner.get_string(key).await
        }

        async fn set_string(&self, key: &str, value: &str, ttl: Duration) -> bool {
            let written = self.inner.set_string(key, value, ttl).await;
            let view = (
                self.inner.get_string("Sync_k").await,
                self.inner.get_string("Data_k").await,
            );
            self.views.lock().unwrap().push(view);
            written
        }

        async fn delete(&self, key: &str) -> bool {
            self.inner.delete(key).await
        }
    }

    #[test]
    fn test_layout_parsing() {
        assert_eq!("hash".parse::<RemoteLayout>().unwrap(), RemoteLayout::Hash);
        assert_eq!(" Split ".parse::<RemoteLayout>().unwrap(), RemoteLayout::Split);
        assert!("redis".parse::<RemoteLayout>().is_err());
        assert_eq!(RemoteLayout::Split.to_string(), "split");
    }

    #[tokio::test]
    async fn test_hash_publish_then_check() {
        let remote = HashRepresentation::new(InMemoryRemote::new(100, 300));

        assert!(remote.publish("k", "t1", r#"{"a":1}"#, TTL).await);
        let version = remote.check("k").await.unwrap();

        assert_eq!(version.token(), "t1");
        assert_eq!(remote.load_payload("k", &version).await.as_deref(), Some(r#"{"a":1}"#));
    }

    #[tokio::test]
    async fn test_hash_check_empty() {
        let remote = HashRepresentation::new(InMemoryRemote::new(100, 300));
        assert!(remote.check("k").await.is_none());
    }

    #[tokio::test]
    async fn test_hash_needs_both_fields() {
        let store = InMemoryRemote::new(100, 300);
        store.set_hash("k", &[(SYNC_FIELD, "t1")], TTL).await;
        let remote = HashRepresentation::new(store);

        assert!(remote.check("k").await.is_none());
    }

    #[tokio::test]
    async fn test_hash_blank_token_is_no_record() {
        let store = InMemoryRemote::new(100, 300);
        store
            .set_hash("k", &[(SYNC_FIELD, "  "), (DATA_FIELD, "{}")], TTL)
            .await;
        let remote = HashRepresentation::new(store);

        assert!(remote.check("k").await.is_none());
    }

    #[tokio::test]
    async fn test_hash_blank_payload_loads_as_none() {
        let store = InMemoryRemote::new(100, 300);
        store
            .set_hash("k", &[(SYNC_FIELD, "t1"), (DATA_FIELD, "")], TTL)
            .await;
        let remote = HashRepresentation::new(store);

        let version = remote.check("k").await.unwrap();
        assert!(remote.load_payload("k", &version).await.is_none());
    }

    #[tokio::test]
    async fn test_hash_purge() {
        let remote = HashRepresentation::new(InMemoryRemote::new(100, 300));
        remote.publish("k", "t1", "{}", TTL).await;

        remote.purge("k").await;

        assert!(remote.check("k").await.is_none());
    }

    #[tokio::test]
    async fn test_split_publish_writes_two_keys() {
        let remote = SplitKeyRepresentation::new(InMemoryRemote::new(100, 300));

        assert!(remote.publish("k", "t1", "[1,2]", TTL).await);

        assert_eq!(remote.store().get_string("Sync_k").await.as_deref(), Some("t1"));
        assert_eq!(remote.store().get_string("Data_k").await.as_deref(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_split_check_fetches_token_only() {
        let remote = SplitKeyRepresentation::new(InMemoryRemote::new(100, 300));
        remote.publish("k", "t1", "[1,2]", TTL).await;

        let version = remote.check("k").await.unwrap();

        assert_eq!(version, RemoteVersion::token_only("t1"));
        assert_eq!(remote.load_payload("k", &version).await.as_deref(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_split_token_without_payload() {
        let store = InMemoryRemote::new(100, 300);
        store.set_string("Sync_k", "t1", TTL).await;
        let remote = SplitKeyRepresentation::new(store);

        let version = remote.check("k").await.unwrap();
        assert!(remote.load_payload("k", &version).await.is_none());
    }

    #[tokio::test]
    async fn test_split_publish_replaces_old_payload_before_token() {
        let store = InMemoryRemote::new(100, 300);
        store.set_string("Data_k", "old", TTL).await;
        store.set_string("Sync_k", "t1", TTL).await;
        let remote = SplitKeyRepresentation::new(store.clone());

        assert!(remote.publish("k", "t2", "new", TTL).await);

        let version = remote.check("k").await.unwrap();
        assert_eq!(version.token(), "t2");
        assert_eq!(remote.load_payload("k", &version).await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_split_new_token_never_pairs_with_old_payload() {
        let inner = InMemoryRemote::new(100, 300);
        // Token gone, payload of an older version still live
        inner.set_string("Data_k", "old", TTL).await;
        let remote = SplitKeyRepresentation::new(ReaderView {
            inner,
            views: Mutex::new(Vec::new()),
        });

        assert!(remote.publish("k", "t2", "new", TTL).await);

        let views = remote.store().views.lock().unwrap().clone();
        assert_eq!(views.len(), 2);
        for (token, payload) in views {
            if token.as_deref() == Some("t2") {
                assert_eq!(payload.as_deref(), Some("new"));
            }
        }
    }

    #[tokio::test]
    async fn test_split_failed_payload_write_keeps_old_token() {
        let store = InMemoryRemote::new(100, 300);
        store.set_string("Data_k", "old", TTL).await;
        store.set_string("Sync_k", "t1", TTL).await;
        let remote = SplitKeyRepresentation::new(store.clone());

        // Payload over the value size limit is refused by the store
        let oversized = "x".repeat(crate::store::MAX_VALUE_SIZE + 1);
        assert!(!remote.publish("k", "t2", &oversized, TTL).await);

        assert_eq!(store.get_string("Sync_k").await.as_deref(), Some("t1"));
        assert_eq!(store.get_string("Data_k").await.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_split_rejects_keys_beyond_prefixed_limit() {
        let store = InMemoryRemote::new(100, 300);
        let remote = SplitKeyRepresentation::new(store.clone());
        let longest = "k".repeat(MAX_SPLIT_KEY_LENGTH);
        let too_long = "k".repeat(MAX_SPLIT_KEY_LENGTH + 1);

        assert!(remote.publish(&longest, "t1", "{}", TTL).await);
        assert_eq!(remote.check(&longest).await.unwrap().token(), "t1");

        assert!(!remote.publish(&too_long, "t1", "{}", TTL).await);
        assert!(remote.check(&too_long).await.is_none());
        assert_eq!(store.shared().read().await.stats().total_entries, 2);
    }

    #[tokio::test]
    async fn test_hash_accepts_full_length_key() {
        let remote = HashRepresentation::new(InMemoryRemote::new(100, 300));
        let key = "k".repeat(MAX_KEY_LENGTH);

        assert!(remote.publish(&key, "t1", "{}", TTL).await);
        assert_eq!(remote.check(&key).await.unwrap().token(), "t1");
    }

    #[tokio::test]
    async fn test_split_purge_removes_both_keys() {
        let remote = SplitKeyRepresentation::new(InMemoryRemote::new(100, 300));
        remote.publish("k", "t1", "{}", TTL).await;

        remote.purge("k").await;

        assert!(remote.store().get_string("Sync_k").await.is_none());
        assert!(remote.store().get_string("Data_k").await.is_none());
    }

    #[tokio::test]
    async fn test_boxed_representation_delegates() {
        let remote = representation_for(RemoteLayout::Split, InMemoryRemote::new(100, 300));

        assert_eq!(remote.layout(), RemoteLayout::Split);
        remote.publish("k", "t1", "{}", TTL).await;
        assert_eq!(remote.check("k").await.unwrap().token(), "t1");
    }
}
