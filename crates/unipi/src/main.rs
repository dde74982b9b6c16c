mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Install the subscriber. `RUST_LOG` wins over everything else.
fn init_tracing(verbosity: u8, debug: bool, long_running: bool) {
    let filter = match verbosity {
        0 if debug => "debug",
        0 if long_running => "info",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli { global, command } = cli;

    match command {
        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "unipi", &mut std::io::stdout());
            Ok(())
        }

        // Config commands must work even when the file does not parse
        Command::Config(args) => {
            init_tracing(global.verbose, false, false);
            commands::config_cmd::handle(args, &global)
        }

        // Everything else needs a valid configuration
        cmd => {
            let cfg = config::resolve(&global)?;

            let (long_running, debug_flag) = match &cmd {
                Command::Run(args) => (true, args.debug),
                _ => (false, false),
            };
            init_tracing(global.verbose, debug_flag || cfg.mode.is_debug(), long_running);

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &cfg, &global).await
        }
    }
}
