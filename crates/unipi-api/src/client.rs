// EVOK REST HTTP client
//
// Wraps `reqwest::Client` with EVOK URL construction, status checking and
// envelope unwrapping. Endpoint methods live in `devices.rs` so this module
// stays focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::Envelope;
use crate::transport::{RelayMethod, TransportConfig};

/// Raw HTTP client for a UniPi controller's EVOK REST API.
///
/// Every method returns a typed `Result`; deciding what a failure means for
/// a polling cycle is left to the caller.
pub struct EvokClient {
    http: reqwest::Client,
    base_url: Url,
    relay_method: RelayMethod,
}

impl EvokClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` is the controller root, e.g. `http://192.168.1.10:8080`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            relay_method: transport.relay_method,
        })
    }

    /// Create a client for `http://{host}:{port}`.
    pub fn from_host_port(host: &str, port: u16, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("http://{host}:{port}"))?;
        Self::new(base_url, transport)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            relay_method: RelayMethod::default(),
        }
    }

    /// Switch the relay write style.
    pub fn with_relay_method(mut self, relay_method: RelayMethod) -> Self {
        self.relay_method = relay_method;
        self
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn relay_method(&self) -> RelayMethod {
        self.relay_method
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/rest/{path}`.
    pub(crate) fn rest_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/rest/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the (possibly wrapped) payload.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;

        Self::parse_response(resp).await
    }

    /// Send a GET request with query parameters.
    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).query(query).send().await?;

        Self::parse_response(resp).await
    }

    /// Send a POST request with a JSON body.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);

        let resp = self.http.post(url).json(body).send().await?;

        Self::parse_response(resp).await
    }

    /// Accept only 200 and 201, then decode the body.
    async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::CREATED {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let body = resp.text().await?;
        trace!(len = body.len(), "response body received");

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        Ok(envelope.into_inner())
    }
}
