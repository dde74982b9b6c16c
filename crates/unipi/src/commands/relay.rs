//! `unipi relay UNIT on|off`: one hub command, applied immediately.

use unipi_core::{Bridge, CommandOutcome, RelayCommand};

use crate::cli::{GlobalOpts, RelayArgs, RelayState};
use crate::config::{self, Config};
use crate::error::CliError;

pub async fn handle(args: RelayArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let table = config::open_table(cfg)?;
    let bridge = Bridge::new(cfg.to_bridge_config()?, table)?;

    let command = match args.state {
        RelayState::On => RelayCommand::On,
        RelayState::Off => RelayCommand::Off,
    };

    match bridge.execute(args.unit, command).await {
        CommandOutcome::Applied(applied) => {
            bridge.devices().save()?;
            if !global.quiet {
                eprintln!("Unit {} switched {applied}", args.unit);
            }
            Ok(())
        }
        CommandOutcome::Rejected(rejected) => Err(CliError::CommandRejected {
            unit: args.unit,
            command: rejected.to_string(),
        }),
        CommandOutcome::UnknownUnit => Err(CliError::NotFound {
            resource_type: "device".into(),
            identifier: args.unit.to_string(),
            list_command: "devices list".into(),
        }),
    }
}
