//! CLI error types with miette diagnostics.
//!
//! Maps core and config errors into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use unipi_config::ConfigError;
use unipi_core::{CoreError, HubError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(unipi::connection_failed),
        help(
            "Check that EVOK is running and reachable.\n\
             URL: {url}\n\
             Try: unipi remote --host <address> --port <port>"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request to the controller timed out")]
    #[diagnostic(
        code(unipi::timeout),
        help("Increase timeout with --timeout or check controller responsiveness.")
    )]
    Timeout,

    // ── Controller ───────────────────────────────────────────────────

    #[error("Controller API error ({code}): {message}")]
    #[diagnostic(code(unipi::api_error))]
    ApiError { code: String, message: String },

    #[error("Controller did not apply '{command}' to unit {unit}")]
    #[diagnostic(
        code(unipi::command_rejected),
        help("The device record was left unchanged. Re-run with -v for the controller's answer.")
    )]
    CommandRejected { unit: u32, command: String },

    // ── Device table ─────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(unipi::not_found),
        help("Run: unipi {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' already exists")]
    #[diagnostic(code(unipi::conflict))]
    Conflict {
        resource_type: String,
        identifier: String,
    },

    #[error("Device table at {path} is unusable: {reason}")]
    #[diagnostic(
        code(unipi::state),
        help("Fix or delete the file; it is rebuilt from the controller on the next start.")
    )]
    State { path: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unipi::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(unipi::config),
        help("Inspect the effective settings with: unipi config show")
    )]
    Config(#[from] ConfigError),

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::Config(ConfigError::Validation { .. }) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ControllerUnreachable { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Api { message, status } => CliError::ApiError {
                code: status.map_or_else(|| "response".into(), |s| s.to_string()),
                message,
            },

            CoreError::Hub(hub) => hub.into(),

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl From<HubError> for CliError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::UnitNotFound(unit) => CliError::NotFound {
                resource_type: "device".into(),
                identifier: unit.to_string(),
                list_command: "devices list".into(),
            },
            HubError::UnitTaken(unit) => CliError::Conflict {
                resource_type: "device".into(),
                identifier: unit.to_string(),
            },
            HubError::Persist { path, reason } | HubError::Load { path, reason } => {
                CliError::State {
                    path: path.display().to_string(),
                    reason,
                }
            }
        }
    }
}

impl From<unipi_api::Error> for CliError {
    fn from(err: unipi_api::Error) -> Self {
        CoreError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_unit_maps_to_not_found_exit_code() {
        let err = CliError::from(CoreError::Hub(HubError::UnitNotFound(7)));
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "device '7' not found");
    }

    #[test]
    fn unreachable_controller_maps_to_connection_exit_code() {
        let err = CliError::from(CoreError::ControllerUnreachable {
            url: "http://10.0.0.1:8080/".into(),
            reason: "connection refused".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn http_status_is_kept_as_code() {
        let err = CliError::from(unipi_api::Error::Status {
            status: 500,
            body: "boom".into(),
        });
        assert!(matches!(err, CliError::ApiError { ref code, .. } if code == "500"));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err = CliError::from(ConfigError::Validation {
            field: "port".into(),
            reason: "must be between 1 and 65535".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
