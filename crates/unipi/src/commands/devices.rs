//! Device table command handlers.

use tabled::Tabled;

use unipi_core::{Bridge, DeviceRepository, DeviceTable, LocalDevice, Unit};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Unit")]
    unit: Unit,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Circuit")]
    circuit: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Type")]
    class: String,
    #[tabled(rename = "Value")]
    n_value: i64,
    #[tabled(rename = "State")]
    s_value: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl DeviceRow {
    fn new(d: &LocalDevice, color: bool) -> Self {
        Self {
            unit: d.unit,
            name: d.name.clone(),
            circuit: d.device_id.clone(),
            role: d.role().to_string(),
            class: class_of(d),
            n_value: d.n_value,
            s_value: output::paint_state(&d.s_value, color),
            updated: updated_of(d),
        }
    }
}

fn class_of(d: &LocalDevice) -> String {
    format!("{}/{}/{}", d.device_type, d.subtype, d.switch_type)
}

fn updated_of(d: &LocalDevice) -> String {
    d.last_update.map_or_else(
        || "-".into(),
        |t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

fn detail(d: &LocalDevice) -> String {
    [
        format!("Unit:     {}", d.unit),
        format!("Name:     {}", d.name),
        format!("Circuit:  {}", d.device_id),
        format!("Role:     {}", d.role()),
        format!("Type:     {}", class_of(d)),
        format!("Value:    {}", d.n_value),
        format!("State:    {}", if d.s_value.is_empty() { "-" } else { d.s_value.as_str() }),
        format!("Updated:  {}", updated_of(d)),
    ]
    .join("\n")
}

fn not_found(unit: Unit) -> CliError {
    CliError::NotFound {
        resource_type: "device".into(),
        identifier: unit.to_string(),
        list_command: "devices list".into(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DevicesArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let format = config::output_format(global, cfg);
    let color = output::should_color(config::color_mode(global, cfg));
    let table = config::open_table(cfg)?;

    match args.command {
        DevicesCommand::List => {
            let devices = table.all();
            let out = output::render_list(
                format,
                &devices,
                |d| DeviceRow::new(d, color),
                |d| d.unit.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { unit } => {
            let device = table.get(unit).ok_or_else(|| not_found(unit))?;
            let out = output::render_single(format, &device, detail, |d| d.unit.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Sync => sync_once(table, cfg, global).await,

        DevicesCommand::Remove { unit } => {
            let removed = table.remove(unit).ok_or_else(|| not_found(unit))?;
            if !global.quiet {
                eprintln!("Removed unit {} ({})", removed.unit, removed.name);
            }
            Ok(())
        }
    }
}

/// One start trigger followed by one heartbeat.
async fn sync_once(table: DeviceTable, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let bridge = Bridge::new(cfg.to_bridge_config()?, table)?;

    let mut lines = Vec::new();
    if let Some(startup) = bridge.on_start().await {
        lines.push(format!(
            "created={} unsupported={}",
            startup.created.len(),
            startup.unsupported.len()
        ));
    }
    let report = bridge.on_heartbeat().await;
    lines.push(report.to_string());

    bridge.devices().save()?;
    output::print_output(&lines.join("\n"), global.quiet);
    Ok(())
}
