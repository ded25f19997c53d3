//! # Configuration Objects
//!
//! Settings handed to the core at construction time by the (external)
//! configuration layer. Read once; no hot-reload contract.

use serde::{Deserialize, Serialize};

/// Default hard cap for a message store.
pub const DEFAULT_MAX_SIZE: usize = 5000;

/// Default soft threshold for a message store.
pub const DEFAULT_PREFERRED_SIZE: usize = 5000;

/// Default payload length retained in topic summaries.
pub const DEFAULT_MAX_PAYLOAD_LENGTH: usize = 1024;

/// Sizing and identity of a single message store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Human-readable store name, used in logs and batch grouping.
    pub name: String,
    /// Soft threshold; exceeding it signals the store should prune.
    pub preferred_size: usize,
    /// Hard cap, enforced on every insert.
    pub max_size: usize,
    /// Maximum payload length kept in per-topic summaries.
    pub max_payload_length: usize,
}

impl StoreConfig {
    /// Create a config with default sizing.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            preferred_size: DEFAULT_PREFERRED_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            max_payload_length: DEFAULT_MAX_PAYLOAD_LENGTH,
        }
    }

    /// Override the size thresholds.
    #[must_use]
    pub fn with_sizes(mut self, preferred_size: usize, max_size: usize) -> Self {
        self.preferred_size = preferred_size;
        self.max_size = max_size;
        self
    }
}

/// Per-connection reconnection behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectionSettings {
    /// Minimum gap between connection attempts, milliseconds.
    pub retry_interval_ms: u64,
    /// Whether subscriptions are replayed after a successful reconnect.
    pub resubscribe: bool,
}

impl Default for ReconnectionSettings {
    fn default() -> Self {
        Self {
            retry_interval_ms: 5000,
            resubscribe: true,
        }
    }
}

/// Audit replay tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySettings {
    /// Interval of the virtual-clock ticking task, milliseconds.
    pub tick_interval_ms: u64,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
        }
    }
}
