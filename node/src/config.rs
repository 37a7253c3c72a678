//! Masternode configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use vigil_network::NtpDriftMonitor;
use vigil_types::params::{DEFAULT_GAS_PRICE, PING_INTERVAL_SECS};
use vigil_types::NetworkParams;

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for the masternode manager.
///
/// Can be loaded from a TOML file via [`MasternodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MasternodeConfig {
    /// Chain parameters (from genesis, not the TOML file).
    #[serde(skip)]
    pub network: NetworkParams,

    /// Seconds between liveness pings.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,

    /// Seconds between clock-drift checks.
    #[serde(default = "default_drift_interval")]
    pub drift_check_interval_secs: u64,

    /// Seconds before the first clock-drift check.
    #[serde(default = "default_drift_initial_delay")]
    pub drift_check_initial_delay_secs: u64,

    /// Gas price used when the oracle fails.
    #[serde(default = "default_gas_price")]
    pub default_gas_price: u64,

    /// Log the registration payload at startup when not yet registered.
    #[serde(default)]
    pub seek_registration: bool,

    /// Clock drift tolerated before warning, in milliseconds.
    #[serde(default = "default_max_clock_drift")]
    pub max_clock_drift_ms: i64,

    /// Seconds `stop` waits for background tasks.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_ping_interval() -> u64 {
    PING_INTERVAL_SECS
}

fn default_drift_interval() -> u64 {
    600
}

fn default_drift_initial_delay() -> u64 {
    1
}

fn default_gas_price() -> u64 {
    DEFAULT_GAS_PRICE as u64
}

fn default_max_clock_drift() -> i64 {
    10_000
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl MasternodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn with_network(mut self, network: NetworkParams) -> Self {
        self.network = network;
        self
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn drift_check_interval(&self) -> Duration {
        Duration::from_secs(self.drift_check_interval_secs)
    }

    pub fn drift_check_initial_delay(&self) -> Duration {
        Duration::from_secs(self.drift_check_initial_delay_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn parsed_log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    /// SNTP drift monitor against the public pool, warning past
    /// `max_clock_drift_ms`.
    pub fn drift_monitor(&self) -> NtpDriftMonitor {
        NtpDriftMonitor::new(self.max_clock_drift_ms)
    }
}

impl Default for MasternodeConfig {
    fn default() -> Self {
        Self {
            network: NetworkParams::default(),
            ping_interval_secs: default_ping_interval(),
            drift_check_interval_secs: default_drift_interval(),
            drift_check_initial_delay_secs: default_drift_initial_delay(),
            default_gas_price: default_gas_price(),
            seek_registration: false,
            max_clock_drift_ms: default_max_clock_drift(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
