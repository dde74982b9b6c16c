// ── Runtime bridge configuration ──
//
// Describes *how* to reach the controller and how often to poll. Never
// touches disk: `unipi-config` (or a test) builds a `BridgeConfig` and
// hands it in.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use unipi_api::{RelayMethod, TransportConfig};

use crate::error::CoreError;

/// Verbosity toggle supplied by the hosting environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    #[default]
    #[serde(alias = "Normal")]
    Normal,
    #[serde(alias = "Debug")]
    Debug,
}

impl LogMode {
    pub fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Configuration for bridging a single controller.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Controller address (IP or host name).
    pub host: String,
    /// EVOK REST port.
    pub port: u16,
    /// Normal or debug logging.
    pub mode: LogMode,
    /// Interval between reconciliation passes.
    pub heartbeat: Duration,
    /// Per-request timeout for controller calls.
    pub timeout: Duration,
    /// How relay writes are sent.
    pub relay_method: RelayMethod,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            mode: LogMode::Normal,
            heartbeat: Duration::from_secs(2),
            timeout: unipi_api::transport::DEFAULT_TIMEOUT,
            relay_method: RelayMethod::Post,
        }
    }
}

impl BridgeConfig {
    /// `http://{host}:{port}`
    pub fn base_url(&self) -> Result<Url, CoreError> {
        let raw = format!("http://{}:{}", self.host, self.port);
        Url::parse(&raw).map_err(|e| CoreError::Config {
            message: format!("invalid controller address {raw}: {e}"),
        })
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::default()
            .with_timeout(self.timeout)
            .with_relay_method(self.relay_method)
    }
}
