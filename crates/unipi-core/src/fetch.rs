// ── Failure-swallowing controller access ──
//
// The bridge never lets a controller problem escape a trigger. These
// wrappers turn every API error into "no data this cycle" plus a log line.

use tracing::{debug, error};

use unipi_api::{EvokClient, RemoteDevice};

/// Fetch every device, or an empty list if the controller is unusable.
pub async fn fetch_all(client: &EvokClient) -> Vec<RemoteDevice> {
    match client.list_all().await {
        Ok(devices) => {
            debug!(count = devices.len(), "fetched controller devices");
            devices
        }
        Err(e) => {
            error!(url = %client.base_url(), error = %e, "could not fetch devices from controller");
            Vec::new()
        }
    }
}

/// Write a relay value. `true` only if the controller accepted it and
/// answered with a non-empty payload.
pub async fn write_relay(client: &EvokClient, circuit: &str, value: u8) -> bool {
    match client.write_relay(circuit, value).await {
        Ok(answer) if is_truthy(&answer) => true,
        Ok(answer) => {
            error!(circuit, %answer, "controller returned an empty answer to relay write");
            false
        }
        Err(e) => {
            error!(circuit, error = %e, "relay write failed");
            false
        }
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}
