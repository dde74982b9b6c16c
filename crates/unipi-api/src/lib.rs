// unipi-api: Async Rust client for the UniPi EVOK REST API

pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod transport;

pub use client::EvokClient;
pub use error::Error;
pub use models::{DeviceKind, RemoteDevice};
pub use transport::{RelayMethod, TransportConfig};
