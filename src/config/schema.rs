//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and
//! every field has a default so an empty file is a valid config.

use serde::{Deserialize, Serialize};

use crate::combine::TimeoutStrategy;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Request defaults.
    pub client: ClientSettings,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Request defaults applied by [`SignalClient`](crate::SignalClient).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClientSettings {
    /// Timeout applied when a request sets none. 0 disables it.
    pub default_timeout_millis: u64,

    /// How deadlines are realized.
    pub strategy: TimeoutStrategy,

    /// User-Agent header sent by the reqwest transport.
    pub user_agent: String,

    /// TCP connect timeout for the reqwest transport. 0 keeps reqwest's default.
    pub connect_timeout_millis: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            default_timeout_millis: 0,
            strategy: TimeoutStrategy::Signal,
            user_agent: concat!("signal-fetch/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_millis: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
