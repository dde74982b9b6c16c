//! `unipi run`: the long-running bridge.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use unipi_core::{Bridge, HubEvent, LogMode, Runtime};

use crate::cli::RunArgs;
use crate::config::{self, Config};
use crate::error::CliError;

const EVENT_BUFFER: usize = 32;

pub async fn handle(args: RunArgs, cfg: &Config) -> Result<(), CliError> {
    let mut cfg = cfg.clone();
    if args.debug {
        cfg.mode = LogMode::Debug;
    }
    if let Some(secs) = args.heartbeat {
        cfg.heartbeat_secs = secs;
    }

    let bridge_config = cfg.to_bridge_config()?;
    let table = config::open_table(&cfg)?;
    let bridge = Bridge::new(bridge_config, table)?;

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let cancel = CancellationToken::new();

    if args.stdin_commands {
        tokio::spawn(read_commands(tx, cancel.clone()));
    } else {
        drop(tx);
    }
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    let bridge = Runtime::new(bridge).run(rx, cancel).await;
    bridge.devices().save()?;
    info!(devices = bridge.devices().len(), "bridge stopped");
    Ok(())
}

/// Forward `UNIT COMMAND [LEVEL]` lines from stdin as command events.
async fn read_commands(tx: mpsc::Sender<HubEvent>, cancel: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "stdin closed");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match HubEvent::parse_command_line(&line) {
                    Some(event) => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    None => warn!(line, "expected `UNIT COMMAND [LEVEL]`"),
                }
            }
        }
    }
}

async fn shutdown_on_signal(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "could not listen for interrupt");
        return;
    }
    info!("interrupt received, stopping");
    cancel.cancel();
}
