//! Coordinator Module
//!
//! Keeps the local tier coherent with the shared tier.
//!
//! A lookup first trusts a local entry for the gating window
//! ([`MINIMUM_RECHECK_INTERVAL`] by default). Past the window it compares the
//! local sync token with the remote one: a match keeps the local data, a
//! difference pulls the remote payload, and an empty or unusable remote
//! record sends the call to the caller's fallback. Fallback results are
//! written locally first and then published with a fresh token.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::cache::{CachedEntry, LocalCache};
use crate::config::Config;
use crate::error::CoherenceError;
use crate::remote::{representation_for, HttpRemote, RemoteRepresentation, RemoteVersion};

mod lookup;


pub use lookup::{CoordinatorStats, Lookup, LookupSource};
use lookup::CoordinatorCounters;

/// Default gating window between two remote checks of the same key.
pub const MINIMUM_RECHECK_INTERVAL: Duration = Duration::from_secs(10);

// == Cache Coordinator ==
/// Two-tier lookup over a shared [`LocalCache`] and a remote representation.
///
/// Gating and expiry both read the local cache's clock.
///
/// The coordinator never holds the local cache lock across a remote call or
/// the fallback, and it does not serialize concurrent lookups of one key:
/// overlapping cold lookups may each run the fallback, and the last write
/// wins on both tiers.
pub struct CacheCoordinator<R> {
    local: Arc<RwLock<LocalCache>>,
    remote: R,
    recheck_interval: chrono::Duration,
    counters: CoordinatorCounters,
}

impl<R> std::fmt::Debug for CacheCoordinator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCoordinator")
            .field("recheck_interval", &self.recheck_interval)
            .field("stats", &self.counters.snapshot())
            .finish()
    }
}

impl CacheCoordinator<Box<dyn RemoteRepresentation>> {
    /// Builds a coordinator that talks to the shared tier server named in
    /// `config`, in the configured layout.
    ///
    /// # Arguments
    /// * `config` - Remote URL, timeout, layout and gating window
    /// * `local` - The process-wide local tier
    pub fn from_config(
        config: &Config,
        local: Arc<RwLock<LocalCache>>,
    ) -> Result<Self, CoherenceError> {
        let client = HttpRemote::new(&config.remote_url, config.remote_timeout())?;
        info!(
            remote = %client.base_url(),
            layout = %config.remote_layout,
            "connecting cache coordinator to shared tier"
        );

        Ok(Self::new(local, representation_for(config.remote_layout, client))
            .with_recheck_interval(config.recheck_interval()))
    }
}

impl<R: RemoteRepresentation> CacheCoordinator<R> {
    // == Constructor ==
    /// Creates a coordinator with the default gating window.
    ///
    /// # Arguments
    /// * `local` - The local tier, usually shared by every coordinator in the process
    /// * `remote` - Representation of the shared tier
    pub fn new(local: Arc<RwLock<LocalCache>>, remote: R) -> Self {
        Self {
            local,
            remote,
            recheck_interval: to_chrono(MINIMUM_RECHECK_INTERVAL),
            counters: CoordinatorCounters::default(),
        }
    }

    /// Replaces the gating window.
    pub fn with_recheck_interval(mut self, interval: Duration) -> Self {
        self.recheck_interval = to_chrono(interval);
        self
    }

    pub fn local(&self) -> &Arc<RwLock<LocalCache>> {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Returns a snapshot of this coordinator's counters.
    pub fn stats(&self) -> CoordinatorStats {
        self.counters.snapshot()
    }

    // == Get ==
    /// Returns the best-known value for `key`, or None if no tier and not the
    /// fallback can produce one.
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `expiry` - Logical lifetime of the value; the shared tier keeps it
    ///   this long, the local tier twice as long
    /// * `fallback` - Authoritative source, called at most once
    ///
    /// # Errors
    /// Only errors from `fallback`, returned unchanged.
    pub async fn get<T, F, Fut, E>(
        &self,
        key: &str,
        expiry: Duration,
        fallback: F,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        self.get_with_source(key, expiry, fallback)
            .await
            .map(Lookup::into_value)
    }

    /// Same as [`get`](Self::get), also reporting which tier answered.
    pub async fn get_with_source<T, F, Fut, E>(
        &self,
        key: &str,
        expiry: Duration,
        fallback: F,
    ) -> Result<Lookup<T>, E>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let (now, local) = {
            let mut cache = self.local.write().await;
            (cache.now(), cache.get::<T>(key))
        };

        // Inside the gating window the local entry is trusted as is
        if let Some(entry) = &local {
            if !entry.needs_sync_check(now, self.recheck_interval) {
                self.counters.record_local_hit();
                debug!(key, "serving local entry inside gating window");
                return Ok(Lookup::found(entry.data.clone(), LookupSource::Local));
            }
        }

        self.counters.record_remote_check();
        match self.remote.check(key).await {
            Some(version) => {
                if let Some(entry) = local.filter(|entry| entry.sync_id == version.token()) {
                    let mut cache = self.local.write().await;
                    let checked_at = cache.now();
                    cache.mark_checked(key, checked_at);
                    drop(cache);
                    self.counters.record_remote_match();
                    debug!(key, "remote token matches local entry");
                    return Ok(Lookup::found(entry.data, LookupSource::RemoteMatch));
                }

                match self.load_remote::<T>(key, &version).await {
                    Ok(data) => {
                        let mut cache = self.local.write().await;
                        let entry =
                            CachedEntry::synced(data.clone(), version.into_token(), cache.now(), expiry);
                        cache.insert(key, entry);
                        drop(cache);
                        self.counters.record_remote_refresh();
                        debug!(key, "local entry refreshed from shared tier");
                        return Ok(Lookup::found(data, LookupSource::RemoteRefresh));
                    }
                    Err(err) => {
                        self.counters.record_corrupt_payload();
                        error!(key, error = %err, "discarding unusable shared tier record");
                        self.remote.purge(key).await;
                    }
                }
            }
            None => debug!(key, "no record in shared tier"),
        }

        self.call_fallback(key, expiry, fallback).await
    }

    // == Invalidate ==
    /// Drops `key` from the local tier and purges it from the shared tier,
    /// so the next lookup from any process reaches the fallback.
    pub async fn invalidate(&self, key: &str) {
        self.local.write().await.remove(key);
        self.remote.purge(key).await;
        debug!(key, "invalidated");
    }

    async fn load_remote<T>(&self, key: &str, version: &RemoteVersion) -> Result<T, CoherenceError>
    where
        T: DeserializeOwned,
    {
        let payload = self
            .remote
            .load_payload(key, version)
            .await
            .ok_or_else(|| CoherenceError::MissingPayload(key.to_string()))?;

        serde_json::from_str(&payload).map_err(|source| CoherenceError::Deserialization {
            key: key.to_string(),
            source,
        })
    }

    async fn call_fallback<T, F, Fut, E>(
        &self,
        key: &str,
        expiry: Duration,
        fallback: F,
    ) -> Result<Lookup<T>, E>
    where
        T: Serialize + Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        self.counters.record_fallback_call();

        let Some(data) = fallback().await? else {
            self.counters.record_fallback_miss();
            self.local.write().await.remove(key);
            debug!(key, "fallback found nothing");
            return Ok(Lookup::miss());
        };

        let token = {
            let mut cache = self.local.write().await;
            let entry = CachedEntry::from_fallback(data.clone(), cache.now(), expiry);
            let token = entry.sync_id.clone();
            cache.insert(key, entry);
            token
        };

        match serde_json::to_string(&data) {
            Ok(payload) => {
                self.remote.publish(key, &token, &payload, expiry).await;
                debug!(key, "fallback value published to shared tier");
            }
            Err(source) => {
                let err = CoherenceError::Serialization {
                    key: key.to_string(),
                    source,
                };
                error!(key, error = %err, "fallback value kept local only");
            }
        }

        Ok(Lookup::found(data, LookupSource::Fallback))
    }
}

fn to_chrono(interval: Duration) -> chrono::Duration {
    chrono::Duration::from_std(interval).unwrap_or(chrono::Duration::MAX)
}
