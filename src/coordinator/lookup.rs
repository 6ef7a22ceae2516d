//! Lookup Outcome Module
//!
//! What a coordinator call returned and where the value came from, plus the
//! per-coordinator counters behind [`CoordinatorStats`].

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Lookup Source ==
/// Which layer answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    /// Local entry inside the gating window, remote not consulted
    Local,
    /// Remote token matched the local one
    RemoteMatch,
    /// Remote held a newer version, local entry replaced
    RemoteRefresh,
    /// Fallback produced the value
    Fallback,
    /// No layer had a value
    Miss,
}

// == Lookup ==
/// The value of a lookup together with its [`LookupSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<T> {
    pub value: Option<T>,
    pub source: LookupSource,
}

impl<T> Lookup<T> {
    pub(crate) fn found(value: T, source: LookupSource) -> Self {
        Self {
            value: Some(value),
            source,
        }
    }

    pub(crate) fn miss() -> Self {
        Self {
            value: None,
            source: LookupSource::Miss,
        }
    }

    /// Drops the source.
    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

// == Counters ==
/// Atomic counters updated on every call.
#[derive(Debug, Default)]
pub(crate) struct CoordinatorCounters {
    local_hits: AtomicU64,
    remote_checks: AtomicU64,
    remote_matches: AtomicU64,
    remote_refreshes: AtomicU64,
    corrupt_payloads: AtomicU64,
    fallback_calls: AtomicU64,
    fallback_misses: AtomicU64,
}

impl CoordinatorCounters {
    pub(crate) fn record_local_hit(&self) {
        self.local_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_remote_check(&self) {
        self.remote_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_remote_match(&self) {
        self.remote_matches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_remote_refresh(&self) {
        self.remote_refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_corrupt_payload(&self) {
        self.corrupt_payloads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fallback_call(&self) {
        self.fallback_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fallback_miss(&self) {
        self.fallback_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CoordinatorStats {
        CoordinatorStats {
            local_hits: self.local_hits.load(Ordering::Relaxed),
            remote_checks: self.remote_checks.load(Ordering::Relaxed),
            remote_matches: self.remote_matches.load(Ordering::Relaxed),
            remote_refreshes: self.remote_refreshes.load(Ordering::Relaxed),
            corrupt_payloads: self.corrupt_payloads.load(Ordering::Relaxed),
            fallback_calls: self.fallback_calls.load(Ordering::Relaxed),
            fallback_misses: self.fallback_misses.load(Ordering::Relaxed),
        }
    }
}

// == Coordinator Stats ==
/// Point-in-time copy of a coordinator's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    /// Calls answered from the local tier without a remote check
    pub local_hits: u64,
    /// Remote token lookups
    pub remote_checks: u64,
    /// Remote checks whose token matched the local entry
    pub remote_matches: u64,
    /// Remote checks that replaced the local entry
    pub remote_refreshes: u64,
    /// Remote payloads that were missing or failed to decode
    pub corrupt_payloads: u64,
    /// Fallback invocations
    pub fallback_calls: u64,
    /// Fallback invocations that found nothing
    pub fallback_misses: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let counters = CoordinatorCounters::default();
        counters.record_local_hit();
        counters.record_remote_check();
        counters.record_remote_check();
        counters.record_fallback_call();
        counters.record_fallback_miss();

        let stats = counters.snapshot();

        assert_eq!(stats.local_hits, 1);
        assert_eq!(stats.remote_checks, 2);
        assert_eq!(stats.fallback_calls, 1);
        assert_eq!(stats.fallback_misses, 1);
        assert_eq!(stats.remote_matches, 0);
    }

    #[test]
    fn test_lookup_source_serializes_snake_case() {
        let json = serde_json::to_string(&LookupSource::RemoteRefresh).unwrap();
        assert_eq!(json, "\"remote_refresh\"");
    }
}
