//! `unipi remote`: what the controller currently reports.

use serde::Serialize;
use tabled::Tabled;

use unipi_core::{DeviceKind, EvokClient, RemoteDevice, kinds::classify};

use crate::cli::{GlobalOpts, RemoteArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

/// A remote device with its hub classification attached.
#[derive(Serialize)]
struct Classified {
    #[serde(flatten)]
    device: RemoteDevice,
    class: &'static str,
    supported: bool,
}

#[derive(Tabled)]
struct RemoteRow {
    #[tabled(rename = "Circuit")]
    circuit: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Supported")]
    supported: String,
}

impl From<RemoteDevice> for Classified {
    fn from(device: RemoteDevice) -> Self {
        let class = classify(&device.dev);
        Self {
            device,
            class: class.prefix,
            supported: class.is_supported(),
        }
    }
}

pub async fn handle(args: RemoteArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let format = config::output_format(global, cfg);
    let color = output::should_color(config::color_mode(global, cfg));

    let bridge_config = cfg.to_bridge_config()?;
    let client = EvokClient::new(bridge_config.base_url()?, &bridge_config.transport())?;

    let devices: Vec<Classified> = match (args.kind, args.circuit) {
        (Some(kind), Some(circuit)) => {
            let kind = DeviceKind::from(kind);
            vec![client.get_device(&kind, &circuit).await?.into()]
        }
        _ => client.list_all().await?.into_iter().map(Classified::from).collect(),
    };

    let out = output::render_list(
        format,
        &devices,
        |c| RemoteRow {
            circuit: c.device.circuit.clone(),
            kind: c.device.dev.to_string(),
            value: c.device.display_value().unwrap_or_else(|| "-".into()),
            class: c.class.to_owned(),
            supported: output::paint_flag(c.supported, color),
        },
        |c| format!("{}/{}", c.device.dev, c.device.circuit),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
