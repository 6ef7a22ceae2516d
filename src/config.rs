//! Configuration Module
//!
//! Loads the shared tier server and coordinator settings from environment
//! variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::remote::RemoteLayout;

/// Server and coordinator configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries in either tier
    pub max_entries: usize,
    /// Default TTL in seconds for shared tier writes without one
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Gating window between remote checks of one key, in seconds
    pub recheck_interval: u64,
    /// Base URL of the shared tier server
    pub remote_url: String,
    /// Per-request timeout against the shared tier, in milliseconds
    pub remote_timeout_ms: u64,
    /// How token and payload are laid out in the shared tier
    pub remote_layout: RemoteLayout,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum entries (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `RECHECK_INTERVAL` - Gating window in seconds (default: 10)
    /// - `REMOTE_URL` - Shared tier server (default: `http://127.0.0.1:3000`)
    /// - `REMOTE_TIMEOUT_MS` - Shared tier request timeout (default: 2000)
    /// - `REMOTE_LAYOUT` - `hash` or `split` (default: `hash`)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_or(env::var("MAX_ENTRIES").ok(), defaults.max_entries),
            default_ttl: parse_or(env::var("DEFAULT_TTL").ok(), defaults.default_ttl),
            server_port: parse_or(env::var("SERVER_PORT").ok(), defaults.server_port),
            cleanup_interval: parse_or(env::var("CLEANUP_INTERVAL").ok(), defaults.cleanup_interval),
            recheck_interval: parse_or(env::var("RECHECK_INTERVAL").ok(), defaults.recheck_interval),
            remote_url: env::var("REMOTE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.remote_url),
            remote_timeout_ms: parse_or(env::var("REMOTE_TIMEOUT_MS").ok(), defaults.remote_timeout_ms),
            remote_layout: parse_or(env::var("REMOTE_LAYOUT").ok(), defaults.remote_layout),
        }
    }

    /// Gating window as a [`Duration`].
    pub fn recheck_interval(&self) -> Duration {
        Duration::from_secs(self.recheck_interval)
    }

    /// Shared tier request timeout as a [`Duration`].
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// Cleanup period, at least one second.
    pub fn cleanup_period(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 300,
            server_port: 3000,
            cleanup_interval: 1,
            recheck_interval: 10,
            remote_url: "http://127.0.0.1:3000".to_string(),
            remote_timeout_ms: 2000,
            remote_layout: RemoteLayout::Hash,
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
