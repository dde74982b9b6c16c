//! CLI configuration: thin wrapper around `unipi_config`.
//!
//! Loads the layered file + environment config and applies `GlobalOpts`
//! flag overrides on top.

use clap::ValueEnum;

use unipi_core::DeviceTable;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use unipi_config::{Config, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Load config and apply flag overrides (flag > env > file > defaults).
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config(global.config.as_deref())?;
    apply_overrides(&mut cfg, global);
    cfg.validate()?;
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        cfg.host.clone_from(host);
    }
    if let Some(port) = global.port {
        cfg.port = port;
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout_secs = timeout;
    }
    if let Some(ref path) = global.state_file {
        cfg.state_file = Some(path.clone());
    }
}

/// Output format: flag, then config default, then `table`.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global
        .output
        .or_else(|| OutputFormat::from_str(&cfg.defaults.output, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// Color mode: flag, then config default, then `auto`.
pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> ColorMode {
    global
        .color
        .or_else(|| ColorMode::from_str(&cfg.defaults.color, true).ok())
        .unwrap_or(ColorMode::Auto)
}

/// Open the persisted device table.
pub fn open_table(cfg: &Config) -> Result<DeviceTable, CliError> {
    let path = cfg.state_file();
    tracing::debug!(path = %path.display(), "opening device table");
    Ok(DeviceTable::open(path)?)
}
