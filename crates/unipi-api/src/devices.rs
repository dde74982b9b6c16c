// EVOK device endpoints
//
// Bulk enumeration via `rest/all`, single-circuit reads via
// `rest/{kind}/{circuit}`, and relay writes via `rest/relay/{circuit}`.

use serde_json::json;
use tracing::debug;

use crate::client::EvokClient;
use crate::error::Error;
use crate::models::{DeviceKind, RemoteDevice};
use crate::transport::RelayMethod;

impl EvokClient {
    /// List every I/O point on the controller, in controller order.
    ///
    /// `GET /rest/all`
    pub async fn list_all(&self) -> Result<Vec<RemoteDevice>, Error> {
        let url = self.rest_url("all")?;
        debug!("listing all devices");
        self.get(url).await
    }

    /// Read a single circuit.
    ///
    /// `GET /rest/{kind}/{circuit}`
    pub async fn get_device(&self, kind: &DeviceKind, circuit: &str) -> Result<RemoteDevice, Error> {
        let url = self.rest_url(&format!("{kind}/{circuit}"))?;
        debug!(%kind, circuit, "reading device");
        self.get(url).await
    }

    /// Switch a relay output.
    ///
    /// `POST /rest/relay/{circuit}` with `{"value": "0"|"1"}`, or
    /// `GET /rest/relay/{circuit}?value=N` when configured for GET writes.
    /// Returns the decoded controller answer.
    pub async fn write_relay(&self, circuit: &str, value: u8) -> Result<serde_json::Value, Error> {
        let url = self.rest_url(&format!("relay/{circuit}"))?;
        let value = value.to_string();
        debug!(circuit, %value, method = ?self.relay_method(), "writing relay");

        match self.relay_method() {
            RelayMethod::Post => self.post(url, &json!({ "value": value })).await,
            RelayMethod::Get => self.get_with_query(url, &[("value", value)]).await,
        }
    }
}
