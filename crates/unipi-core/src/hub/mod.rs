// ── Hub device records ──
//
// The hub owns its device table; the bridge only reads it and writes
// individual records through `DeviceRepository`. Records may disappear at
// any time (the hub user can delete them), so every access is fallible.

mod table;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HubError;
use crate::kinds::{KindClass, Role};

pub use table::DeviceTable;

/// Hub identifier for a device record.
pub type Unit = u32;

/// A hub-side device record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDevice {
    pub unit: Unit,
    pub name: String,
    pub device_type: u8,
    pub subtype: u8,
    pub switch_type: u8,
    /// Controller circuit this record mirrors.
    pub device_id: String,
    pub n_value: i64,
    pub s_value: String,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

impl LocalDevice {
    pub fn role(&self) -> Role {
        Role::of_subtype(self.subtype)
    }
}

/// Everything needed to create a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSpec {
    pub unit: Unit,
    pub name: String,
    pub device_type: u8,
    pub subtype: u8,
    pub switch_type: u8,
    pub device_id: String,
}

impl DeviceSpec {
    pub fn from_class(
        unit: Unit,
        name: impl Into<String>,
        class: KindClass,
        device_id: impl Into<String>,
    ) -> Self {
        Self {
            unit,
            name: name.into(),
            device_type: class.device_type,
            subtype: class.subtype,
            switch_type: class.switch_type,
            device_id: device_id.into(),
        }
    }
}

/// Access to the hub's device table.
pub trait DeviceRepository {
    /// Look up a record. `None` if it was never created or has been deleted.
    fn get(&self, unit: Unit) -> Option<LocalDevice>;

    /// Overwrite the stored value pair of an existing record.
    fn update(&self, unit: Unit, n_value: i64, s_value: &str) -> Result<(), HubError>;

    /// Create a record at `spec.unit`.
    fn create(&self, spec: DeviceSpec) -> Result<Unit, HubError>;

    /// All records, ordered by unit.
    fn all(&self) -> Vec<LocalDevice>;

    fn is_empty(&self) -> bool {
        self.all().is_empty()
    }

    /// Next free unit after the highest one in use (1 for an empty table).
    fn next_unit(&self) -> Unit {
        self.all().iter().map(|d| d.unit).max().map_or(1, |max| max + 1)
    }
}
