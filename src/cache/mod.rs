//! Cache Module
//!
//! The process-local tier: cached entries with coherence metadata, TTL
//! arithmetic, LRU tracking and statistics.

mod entry;
mod local;
mod lru;
mod stats;


// Re-export public types
pub use entry::{expiration_after, new_sync_id, CachedEntry};
pub use local::LocalCache;
pub use lru::LruTracker;
pub use stats::CacheStats;
