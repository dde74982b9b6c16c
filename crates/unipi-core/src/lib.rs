// unipi-core: Reconciliation between EVOK devices and hub device records.

pub mod bridge;
pub mod command;
pub mod config;
pub mod error;
pub mod fetch;
pub mod hub;
pub mod kinds;
pub mod runtime;
pub mod sync;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::{Bridge, CommandOutcome};
pub use command::{HubEvent, Notification, RelayCommand};
pub use config::{BridgeConfig, LogMode};
pub use error::{CoreError, HubError};
pub use hub::{DeviceRepository, DeviceSpec, DeviceTable, LocalDevice, Unit};
pub use kinds::{KindClass, Role};
pub use runtime::Runtime;
pub use sync::{StartupReport, SyncReport};

pub use unipi_api::{DeviceKind, EvokClient, RelayMethod, RemoteDevice};
