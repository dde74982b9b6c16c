// Transport configuration for building the reqwest::Client.
//
// EVOK listens on plain HTTP on the controller's LAN address, so the only
// tuning that matters is the request timeout and how relay writes are sent.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default request timeout. A slow controller stalls a trigger for at most this long.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// How relay writes are sent to `/rest/relay/{circuit}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayMethod {
    /// `POST` with a JSON body `{"value": "1"}`.
    #[default]
    Post,
    /// `GET` with the value in the query string (`?value=1`).
    Get,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub relay_method: RelayMethod,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            relay_method: RelayMethod::default(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("unipi-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| crate::error::Error::ClientBuild(e.to_string()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_relay_method(mut self, relay_method: RelayMethod) -> Self {
        self.relay_method = relay_method;
        self
    }
}
