//! Configuration for the UniPi EVOK bridge.
//!
//! A flat TOML file layered under `UNIPI_*` environment variables, plus
//! translation to `unipi_core::BridgeConfig`. The CLI applies its own flag
//! overrides on top of the loaded [`Config`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use unipi_core::{BridgeConfig, LogMode, RelayMethod};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Controller address (IP or host name).
    #[serde(default = "default_host")]
    pub host: String,

    /// EVOK REST port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// `normal` or `debug`.
    #[serde(default)]
    pub mode: LogMode,

    /// Seconds between reconciliation passes.
    #[serde(default = "default_heartbeat")]
    pub heartbeat_secs: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// `post` (JSON body) or `get` (query string).
    #[serde(default)]
    pub relay_method: RelayMethod,

    /// Where the hub device table is kept. Defaults to the platform data dir.
    pub state_file: Option<PathBuf>,

    /// CLI presentation defaults.
    #[serde(default)]
    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            mode: LogMode::default(),
            heartbeat_secs: default_heartbeat(),
            timeout_secs: default_timeout(),
            relay_method: RelayMethod::default(),
            state_file: None,
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}
fn default_heartbeat() -> u64 {
    2
}
fn default_timeout() -> u64 {
    3
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

impl Config {
    /// Configured state file, or the platform default.
    pub fn state_file(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(default_state_file)
    }

    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(validation("host", "must not be empty"));
        }
        if self.port == 0 {
            return Err(validation("port", "must be between 1 and 65535"));
        }
        if self.heartbeat_secs == 0 {
            return Err(validation("heartbeat_secs", "must be at least 1"));
        }
        if self.timeout_secs == 0 {
            return Err(validation("timeout_secs", "must be at least 1"));
        }
        Ok(())
    }

    /// Translate to the runtime bridge configuration.
    pub fn to_bridge_config(&self) -> Result<BridgeConfig, ConfigError> {
        self.validate()?;
        Ok(BridgeConfig {
            host: self.host.trim().to_owned(),
            port: self.port,
            mode: self.mode,
            heartbeat: Duration::from_secs(self.heartbeat_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            relay_method: self.relay_method,
        })
    }
}

fn validation(field: &str, reason: &str) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "unipi", "unipi-bridge")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the hub device table.
pub fn default_state_file() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".local/share").join("devices.json"),
        |dirs| dirs.data_dir().join("devices.json"),
    )
}

fn home_fallback(sub: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(sub);
    p.push("unipi-bridge");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
///
/// `path` overrides the platform config path. A missing file is not an
/// error; defaults and environment still apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("UNIPI_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, falling back to defaults on any error.
pub fn load_config_or_default(path: Option<&Path>) -> Config {
    load_config(path).unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path` (or the canonical path).
pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(path)
}
