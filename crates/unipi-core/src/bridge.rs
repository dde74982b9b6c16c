// ── Bridge ──
//
// Owns the controller client and the hub table handle, and exposes one
// async hook per hub trigger. Hooks never fail: every controller or hub
// problem is logged and the trigger ends early.

use tracing::{debug, error, info, warn};

use unipi_api::EvokClient;

use crate::command::{HubEvent, Notification, RelayCommand};
use crate::config::BridgeConfig;
use crate::error::CoreError;
use crate::fetch;
use crate::hub::{DeviceRepository, Unit};
use crate::sync::{self, StartupReport, SyncReport, UpdateOutcome};

/// Result of handling one hub command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The controller accepted the write and the record was updated.
    Applied(RelayCommand),
    /// The controller refused or could not be reached; the record is untouched.
    Rejected(RelayCommand),
    /// No record exists for the unit.
    UnknownUnit,
}

/// A bridge between one EVOK controller and one hub device table.
pub struct Bridge<R> {
    config: BridgeConfig,
    client: EvokClient,
    devices: R,
}

impl<R: DeviceRepository> Bridge<R> {
    /// Build the controller client from `config`.
    pub fn new(config: BridgeConfig, devices: R) -> Result<Self, CoreError> {
        let client = EvokClient::new(config.base_url()?, &config.transport())?;
        Ok(Self {
            config,
            client,
            devices,
        })
    }

    /// Use a pre-built client (tests, custom transports).
    pub fn with_client(config: BridgeConfig, client: EvokClient, devices: R) -> Self {
        Self {
            config,
            client,
            devices,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn client(&self) -> &EvokClient {
        &self.client
    }

    pub fn devices(&self) -> &R {
        &self.devices
    }

    pub fn into_devices(self) -> R {
        self.devices
    }

    // ── Lifecycle hooks ──────────────────────────────────────────────

    /// Start trigger. Creates the initial records if the hub table is empty.
    ///
    /// Returns `None` when the table already had records.
    pub async fn on_start(&self) -> Option<StartupReport> {
        info!(url = %self.client.base_url(), "connecting to controller");
        if self.config.mode.is_debug() {
            self.dump_to_log();
        }

        if !self.devices.is_empty() {
            debug!("device table already populated, skipping creation");
            return None;
        }

        let remote = fetch::fetch_all(&self.client).await;
        let report = sync::create_initial_devices(&remote, &self.devices);
        info!(
            created = report.created.len(),
            unsupported = report.unsupported.len(),
            "initial device creation finished"
        );
        Some(report)
    }

    /// Heartbeat trigger. Mirrors input and temperature readings.
    pub async fn on_heartbeat(&self) -> SyncReport {
        let remote = fetch::fetch_all(&self.client).await;
        let report = sync::reconcile(&remote, &self.devices);
        if report.wrote() {
            debug!(%report, "reconciliation pass");
        }
        report
    }

    /// Command trigger. `level` is accepted and ignored.
    pub async fn on_command(&self, unit: Unit, command: &str, level: i32) -> CommandOutcome {
        debug!(unit, command, level, "command received");
        self.execute(unit, RelayCommand::parse(command)).await
    }

    /// Drive the relay mirrored by `unit` and record the new state on success.
    pub async fn execute(&self, unit: Unit, command: RelayCommand) -> CommandOutcome {
        let Some(device) = self.devices.get(unit) else {
            warn!(unit, "command for unknown unit");
            return CommandOutcome::UnknownUnit;
        };

        let value = command.value();
        if !fetch::write_relay(&self.client, &device.device_id, value).await {
            return CommandOutcome::Rejected(command);
        }

        match sync::update_device(&self.devices, unit, i64::from(value), command.as_ref()) {
            UpdateOutcome::Gone => warn!(unit, "device removed while command was in flight"),
            UpdateOutcome::Updated | UpdateOutcome::Unchanged => {}
        }
        CommandOutcome::Applied(command)
    }

    pub fn on_stop(&self) {
        info!("bridge stopping");
    }

    pub fn on_connect(&self, status: i32, description: &str) {
        info!(status, description, "hub connection");
    }

    pub fn on_message(&self, data: &str) {
        info!(data, "hub message");
    }

    pub fn on_notification(&self, notification: &Notification) {
        info!(
            name = %notification.name,
            subject = %notification.subject,
            text = %notification.text,
            status = %notification.status,
            priority = notification.priority,
            sound = %notification.sound,
            image_file = %notification.image_file,
            "hub notification"
        );
    }

    pub fn on_disconnect(&self) {
        info!("hub disconnected");
    }

    /// Route an inbound event to its hook.
    pub async fn dispatch(&self, event: HubEvent) {
        match event {
            HubEvent::Command {
                unit,
                command,
                level,
            } => {
                if let CommandOutcome::Rejected(cmd) = self.on_command(unit, &command, level).await {
                    error!(unit, command = %cmd, "command not applied");
                }
            }
            HubEvent::Connect {
                status,
                description,
            } => self.on_connect(status, &description),
            HubEvent::Message(data) => self.on_message(&data),
            HubEvent::Notification(n) => self.on_notification(&n),
            HubEvent::Disconnect => self.on_disconnect(),
        }
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn dump_to_log(&self) {
        debug!(
            host = %self.config.host,
            port = self.config.port,
            mode = ?self.config.mode,
            heartbeat = ?self.config.heartbeat,
            timeout = ?self.config.timeout,
            relay_method = ?self.config.relay_method,
            "configuration"
        );
        let devices = self.devices.all();
        debug!(count = devices.len(), "device count");
        for d in devices {
            debug!(
                unit = d.unit,
                name = %d.name,
                device_id = %d.device_id,
                n_value = d.n_value,
                s_value = %d.s_value,
                "device"
            );
        }
    }
}

impl<R> std::fmt::Debug for Bridge<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("url", &self.client.base_url().as_str())
            .finish_non_exhaustive()
    }
}
