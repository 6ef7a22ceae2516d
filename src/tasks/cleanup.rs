//! Expiry Cleanup Tasks
//!
//! Background tasks that periodically remove expired entries from either
//! tier.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::LocalCache;
use crate::store::SharedStore;

/// Something holding entries that can expire.
trait Sweep: Send + Sync + 'static {
    /// Removes expired entries and returns how many went.
    fn sweep(&mut self) -> usize;
}

impl Sweep for SharedStore {
    fn sweep(&mut self) -> usize {
        self.cleanup_expired()
    }
}

impl Sweep for LocalCache {
    fn sweep(&mut self) -> usize {
        self.cleanup_expired()
    }
}

/// Spawns a background task that periodically cleans up expired entries of
/// the shared store.
///
/// # Arguments
/// * `store` - Shared reference to the store
/// * `interval` - Time between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(RwLock::new(SharedStore::new(1000, 300)));
/// let cleanup_handle = spawn_cleanup_task(store.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(store: Arc<RwLock<SharedStore>>, interval: Duration) -> JoinHandle<()> {
    spawn_periodic("shared store", store, interval)
}

/// Spawns a background task that periodically drops expired slots from the
/// local tier. Abort the returned handle at shutdown.
pub fn spawn_sweep_task(cache: Arc<RwLock<LocalCache>>, interval: Duration) -> JoinHandle<()> {
    spawn_periodic("local cache", cache, interval)
}

fn spawn_periodic<S: Sweep>(
    tier: &'static str,
    target: Arc<RwLock<S>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(tier, interval_ms = interval.as_millis() as u64, "starting expiry cleanup task");

        loop {
            tokio::time::sleep(interval).await;

            let removed = target.write().await.sweep();

            if removed > 0 {
                info!(tier, removed, "expiry cleanup removed entries");
            } else {
                debug!(tier, "expiry cleanup found nothing");
            }
        }
    })
}
