// ── In-process hub device table ──
//
// Concurrent map of unit -> record with a version counter that bumps on
// every write. Optionally backed by a JSON state file that is rewritten
// after each mutation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::{DeviceRepository, DeviceSpec, LocalDevice, Unit};
use crate::error::HubError;

/// Device table hosted by this process.
///
/// Each successful `create` or `update` increments [`version`](Self::version),
/// so callers can tell whether a pass wrote anything.
pub struct DeviceTable {
    by_unit: DashMap<Unit, Arc<LocalDevice>>,
    version: watch::Sender<u64>,
    state_file: Option<PathBuf>,
}

impl DeviceTable {
    /// An empty, memory-only table.
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            by_unit: DashMap::new(),
            version,
            state_file: None,
        }
    }

    /// Open a table backed by `path`, loading existing records if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HubError> {
        let path = path.into();
        let mut table = Self::new();

        if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| HubError::Load {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let records: Vec<LocalDevice> =
                serde_json::from_str(&raw).map_err(|e| HubError::Load {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            debug!(count = records.len(), path = %path.display(), "loaded device table");
            for record in records {
                table.by_unit.insert(record.unit, Arc::new(record));
            }
        }

        table.state_file = Some(path);
        Ok(table)
    }

    /// Write all records to the backing file, if any.
    pub fn save(&self) -> Result<(), HubError> {
        let Some(path) = self.state_file.as_deref() else {
            return Ok(());
        };
        write_records(path, &self.all())
    }

    pub fn state_file(&self) -> Option<&Path> {
        self.state_file.as_deref()
    }

    /// Number of writes applied so far.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Subscribe to write notifications.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Remove a record, as the hub user would.
    pub fn remove(&self, unit: Unit) -> Option<LocalDevice> {
        let removed = self.by_unit.remove(&unit).map(|(_, v)| (*v).clone());
        if removed.is_some() {
            self.committed();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.by_unit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_unit.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Bump the version and flush to disk. A failed flush is logged, not fatal.
    fn committed(&self) {
        self.version.send_modify(|v| *v += 1);
        if let Err(e) = self.save() {
            warn!(error = %e, "device table not persisted");
        }
    }
}

impl Default for DeviceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRepository for DeviceTable {
    fn get(&self, unit: Unit) -> Option<LocalDevice> {
        self.by_unit.get(&unit).map(|r| (**r.value()).clone())
    }

    fn update(&self, unit: Unit, n_value: i64, s_value: &str) -> Result<(), HubError> {
        {
            let mut entry = self
                .by_unit
                .get_mut(&unit)
                .ok_or(HubError::UnitNotFound(unit))?;
            let record = Arc::make_mut(entry.value_mut());
            record.n_value = n_value;
            s_value.clone_into(&mut record.s_value);
            record.last_update = Some(Utc::now());
        }
        self.committed();
        Ok(())
    }

    fn create(&self, spec: DeviceSpec) -> Result<Unit, HubError> {
        let unit = spec.unit;
        {
            let dashmap::mapref::entry::Entry::Vacant(slot) = self.by_unit.entry(unit) else {
                return Err(HubError::UnitTaken(unit));
            };
            slot.insert(Arc::new(LocalDevice {
                unit,
                name: spec.name,
                device_type: spec.device_type,
                subtype: spec.subtype,
                switch_type: spec.switch_type,
                device_id: spec.device_id,
                n_value: 0,
                s_value: String::new(),
                last_update: Some(Utc::now()),
            }));
        }
        self.committed();
        Ok(unit)
    }

    fn all(&self) -> Vec<LocalDevice> {
        let mut records: Vec<LocalDevice> =
            self.by_unit.iter().map(|r| (**r.value()).clone()).collect();
        records.sort_by_key(|d| d.unit);
        records
    }

    fn is_empty(&self) -> bool {
        self.by_unit.is_empty()
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_records(path: &Path, records: &[LocalDevice]) -> Result<(), HubError> {
    let persist_err = |reason: String| HubError::Persist {
        path: path.to_path_buf(),
        reason,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| persist_err(e.to_string()))?;
    }
    let json = serde_json::to_string_pretty(records).map_err(|e| persist_err(e.to_string()))?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|e| persist_err(e.to_string()))?;
    std::fs::rename(&tmp, path).map_err(|e| persist_err(e.to_string()))?;
    Ok(())
}
