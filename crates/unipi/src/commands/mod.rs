//! Command dispatch: bridges CLI args -> bridge operations -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod relay;
pub mod remote;
pub mod run;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a config-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Run(args) => run::handle(args, cfg).await,
        Command::Devices(args) => devices::handle(args, cfg, global).await,
        Command::Remote(args) => remote::handle(args, cfg, global).await,
        Command::Relay(args) => relay::handle(args, cfg, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
