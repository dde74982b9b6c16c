//! Config subcommand handlers.

use std::path::PathBuf;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// The file these commands act on: `--config`, or the platform default.
fn target_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&target_path(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::resolve(global)?;
            let format = config::output_format(global, &cfg);
            let shown = Config {
                state_file: Some(cfg.state_file()),
                ..cfg
            };
            let out = match format {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&shown).map_err(unipi_config::ConfigError::from)?
                }
                other => output::render_single(other, &shown, |_| String::new(), |_| String::new()),
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            let path = target_path(global);
            if path.exists() && !force {
                return Err(CliError::Conflict {
                    resource_type: "config file".into(),
                    identifier: path.display().to_string(),
                });
            }

            let mut cfg = Config::default();
            if let Some(ref host) = global.host {
                cfg.host.clone_from(host);
            }
            if let Some(port) = global.port {
                cfg.port = port;
            }
            if let Some(timeout) = global.timeout {
                cfg.timeout_secs = timeout;
            }
            cfg.state_file = global.state_file.clone();
            cfg.validate()?;

            let written = config::save_config(&cfg, Some(&path))?;
            if !global.quiet {
                eprintln!("Wrote {}", written.display());
            }
            Ok(())
        }
    }
}
