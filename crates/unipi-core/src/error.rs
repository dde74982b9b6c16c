// ── Core error types ──
//
// Errors surfaced by unipi-core to its hosts (the CLI). The bridge hooks
// themselves never return these: every failure inside a trigger degrades to
// "skip and log". They exist for construction, persistence and the one-shot
// CLI paths that want a precise diagnostic.

use std::path::PathBuf;

use thiserror::Error;

use crate::hub::Unit;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach controller at {url}: {reason}")]
    ControllerUnreachable { url: String, reason: String },

    #[error("Controller request timed out")]
    Timeout,

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Controller API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if the controller answered).
        status: Option<u16>,
    },

    // ── Hub errors ───────────────────────────────────────────────────
    #[error(transparent)]
    Hub(#[from] HubError),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Failures of the hub-side device table.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Unit {0} is already in use")]
    UnitTaken(Unit),

    #[error("Unit {0} does not exist")]
    UnitNotFound(Unit),

    #[error("Failed to persist device table to {path}: {reason}")]
    Persist { path: PathBuf, reason: String },

    #[error("Failed to load device table from {path}: {reason}")]
    Load { path: PathBuf, reason: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unipi_api::Error> for CoreError {
    fn from(err: unipi_api::Error) -> Self {
        match err {
            unipi_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ControllerUnreachable {
                        url: e.url().map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            unipi_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid controller URL: {e}"),
            },
            unipi_api::Error::ClientBuild(message) => CoreError::Config { message },
            unipi_api::Error::Status { status, body } => CoreError::Api {
                message: format!("HTTP {status}: {body}"),
                status: Some(status),
            },
            unipi_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Unexpected response: {message}"),
                status: None,
            },
        }
    }
}
