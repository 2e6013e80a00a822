//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::jsonp::DEFAULT_MAX_CALLBACK_LEN;

/// Root configuration for jsonpd.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct JsonpdConfig {
    /// HTTP listener configuration.
    pub listener: ListenerConfig,

    /// Callback handling.
    pub jsonp: JsonpConfig,

    /// Plaintext stats listener.
    pub stats: StatsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "localhost:8000").
    pub bind_address: String,

    /// Runtime worker threads.
    pub workers: usize,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl ListenerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "localhost:8000".to_string(),
            workers: default_workers(),
            timeout_ms: 500,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Callback handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct JsonpConfig {
    /// Query parameter carrying the callback name.
    pub callback_param: String,

    /// Longest accepted callback name, in bytes.
    pub max_callback_len: usize,
}

impl Default for JsonpConfig {
    fn default() -> Self {
        Self {
            callback_param: "callback".to_string(),
            max_callback_len: DEFAULT_MAX_CALLBACK_LEN,
        }
    }
}

/// Stats listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StatsConfig {
    /// Enable the stats listener.
    pub enabled: bool,

    /// Stats listener bind address.
    pub bind_address: String,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "localhost:8001".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
