//! Coherent Cache - a two-tier cache kept coherent through sync tokens
//!
//! A process-local [`LocalCache`] sits in front of a shared remote tier.
//! [`CacheCoordinator`] trusts local entries for a short gating window, then
//! compares sync tokens with the shared tier instead of payloads, and falls
//! back to the caller's authoritative source when neither tier has a usable
//! value.
//!
//! The crate also ships the shared tier itself: [`SharedStore`] with an HTTP
//! API ([`api`]), served by the `coherent_cache` binary and reached through
//! [`HttpRemote`].

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod remote;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{CachedEntry, LocalCache};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::Config;
pub use coordinator::{CacheCoordinator, CoordinatorStats, Lookup, LookupSource};
pub use error::{CoherenceError, StoreError};
pub use remote::{
    HashRepresentation, HttpRemote, InMemoryRemote, RemoteLayout, RemoteRepresentation,
    RemoteStore, SplitKeyRepresentation,
};
pub use store::SharedStore;
pub use tasks::{spawn_cleanup_task, spawn_sweep_task};
