//! Clap derive structures for the `unipi` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unipi -- mirror a UniPi EVOK controller into a hub device table
#[derive(Debug, Parser)]
#[command(
    name = "unipi",
    version,
    about = "Bridge a UniPi EVOK controller to a home-automation hub",
    long_about = "Polls a UniPi controller's EVOK REST API, mirrors inputs and\n\
        temperature sensors into a local device table, and drives relays\n\
        on command.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "UNIPI_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Controller address (overrides config)
    #[arg(long, short = 'H', env = "UNIPI_HOST", global = true)]
    pub host: Option<String>,

    /// EVOK REST port (overrides config)
    #[arg(long, short = 'P', env = "UNIPI_PORT", global = true)]
    pub port: Option<u16>,

    /// Device table file (overrides config)
    #[arg(long, env = "UNIPI_STATE_FILE", global = true)]
    pub state_file: Option<PathBuf>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "UNIPI_TIMEOUT_SECS", global = true)]
    pub timeout: Option<u64>,

    /// Output format (defaults to config, then `table`)
    #[arg(long, short = 'o', env = "UNIPI_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bridge: create devices, then poll until interrupted
    Run(RunArgs),

    /// Inspect and maintain the local device table
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// List devices reported by the controller
    #[command(alias = "r")]
    Remote(RemoteArgs),

    /// Switch the relay mirrored by a unit
    Relay(RelayArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Run ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Read `UNIT COMMAND [LEVEL]` lines from stdin and apply them
    #[arg(long)]
    pub stdin_commands: bool,

    /// Heartbeat interval in seconds (overrides config)
    #[arg(long)]
    pub heartbeat: Option<u64>,

    /// Log at debug level and dump configuration on start
    #[arg(long)]
    pub debug: bool,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List device records
    #[command(alias = "ls")]
    List,

    /// Show one device record
    Get {
        /// Unit number
        unit: u32,
    },

    /// Run one creation and one reconciliation pass, then exit
    Sync,

    /// Delete a device record
    #[command(alias = "rm")]
    Remove {
        /// Unit number
        unit: u32,
    },
}

// ── Remote ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RemoteArgs {
    /// Show a single device of this kind (e.g. `relay`, `temp`)
    #[arg(requires = "circuit")]
    pub kind: Option<String>,

    /// Circuit of the single device
    pub circuit: Option<String>,
}

// ── Relay ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RelayArgs {
    /// Unit number of the relay record
    pub unit: u32,

    /// Target state
    pub state: RelayState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RelayState {
    On,
    Off,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with defaults and any flag overrides
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
