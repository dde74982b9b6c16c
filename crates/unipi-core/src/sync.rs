// ── Device reconciliation ──
//
// Pure passes over a fetched device list and the hub table: the one-time
// creation pass and the periodic value mirror. No I/O here besides the
// repository calls, so both passes are tested without a controller.

use std::fmt;

use tracing::{debug, info, warn};

use unipi_api::{DeviceKind, RemoteDevice};

use crate::hub::{DeviceRepository, DeviceSpec, Unit};
use crate::kinds::{Role, classify};

// ── Reports ──────────────────────────────────────────────────────────

/// What the creation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupReport {
    /// Units created, in enumeration order.
    pub created: Vec<Unit>,
    /// Circuits skipped because their kind is unsupported.
    pub unsupported: Vec<String>,
    /// Units consumed, supported or not.
    pub units_consumed: Unit,
}

/// What a reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Units whose stored value was rewritten.
    pub updated: Vec<Unit>,
    /// Units created on the fly for unseen temperature sensors.
    pub created: Vec<Unit>,
    /// Matches whose stored value already agreed with the controller.
    pub unchanged: usize,
    /// Input circuits with no hub record.
    pub missing: Vec<String>,
    /// Circuits matching more than one hub record.
    pub ambiguous: Vec<String>,
    /// Circuits that reported no reading.
    pub no_value: Vec<String>,
}

impl SyncReport {
    /// Whether the pass wrote anything to the hub table.
    pub fn wrote(&self) -> bool {
        !self.updated.is_empty() || !self.created.is_empty()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "updated={} created={} unchanged={} missing={} ambiguous={} no_value={}",
            self.updated.len(),
            self.created.len(),
            self.unchanged,
            self.missing.len(),
            self.ambiguous.len(),
            self.no_value.len()
        )
    }
}

// ── Lookups ──────────────────────────────────────────────────────────

/// Result of joining a circuit against the hub table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Missing,
    Unique(Unit),
    Ambiguous(Vec<Unit>),
}

/// Find the record for `circuit` within `role`.
pub fn resolve(repo: &impl DeviceRepository, circuit: &str, role: Role) -> Resolution {
    let units: Vec<Unit> = repo
        .all()
        .into_iter()
        .filter(|d| d.device_id == circuit && d.role() == role)
        .map(|d| d.unit)
        .collect();

    match units.as_slice() {
        [] => {
            info!(circuit, %role, "device not found");
            Resolution::Missing
        }
        [unit] => Resolution::Unique(*unit),
        _ => {
            warn!(circuit, %role, ?units, "multiple devices with this circuit, cannot update");
            Resolution::Ambiguous(units)
        }
    }
}

/// Outcome of writing a value pair to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    Unchanged,
    /// The record vanished before it could be written.
    Gone,
}

/// Store `(n_value, s_value)` on `unit` if it still exists and differs.
pub fn update_device(
    repo: &impl DeviceRepository,
    unit: Unit,
    n_value: i64,
    s_value: &str,
) -> UpdateOutcome {
    let Some(current) = repo.get(unit) else {
        debug!(unit, "device no longer exists, skipping update");
        return UpdateOutcome::Gone;
    };

    if current.n_value == n_value && current.s_value == s_value {
        return UpdateOutcome::Unchanged;
    }

    match repo.update(unit, n_value, s_value) {
        Ok(()) => {
            info!(unit, name = %current.name, value = s_value, "updated device");
            UpdateOutcome::Updated
        }
        Err(e) => {
            debug!(unit, error = %e, "device disappeared during update");
            UpdateOutcome::Gone
        }
    }
}

// ── Creation pass ────────────────────────────────────────────────────

/// Create one hub record per supported remote device.
///
/// Units are assigned sequentially from 1 in enumeration order, and an
/// unsupported device still consumes its unit. Callers must only run this
/// against an empty table.
pub fn create_initial_devices(
    remote: &[RemoteDevice],
    repo: &impl DeviceRepository,
) -> StartupReport {
    let mut report = StartupReport::default();
    let mut unit: Unit = 1;

    for device in remote {
        let class = classify(&device.dev);
        if class.is_supported() {
            let name = format!("{} {}", class.prefix, device.circuit);
            match repo.create(DeviceSpec::from_class(unit, name, class, &device.circuit)) {
                Ok(created) => {
                    info!(unit = created, kind = %device.dev, circuit = %device.circuit, "created device");
                    report.created.push(created);
                }
                Err(e) => warn!(unit, circuit = %device.circuit, error = %e, "could not create device"),
            }
        } else {
            info!(kind = %device.dev, circuit = %device.circuit, "device type not supported");
            report.unsupported.push(device.circuit.clone());
        }
        unit += 1;
    }

    report.units_consumed = unit - 1;
    report
}

// ── Reconciliation pass ──────────────────────────────────────────────

/// Mirror input and temperature readings into the hub table.
///
/// Unseen temperature sensors get a new record at the next free unit.
/// Ambiguous circuits are never touched.
pub fn reconcile(remote: &[RemoteDevice], repo: &impl DeviceRepository) -> SyncReport {
    let mut report = SyncReport::default();

    for device in remote.iter().filter(|d| d.dev.is_live()) {
        let unit = match resolve(repo, &device.circuit, Role::Sensor) {
            Resolution::Unique(unit) => unit,
            Resolution::Ambiguous(_) => {
                report.ambiguous.push(device.circuit.clone());
                continue;
            }
            Resolution::Missing if device.dev == DeviceKind::Temp => {
                match create_sensor(repo, device) {
                    Some(unit) => {
                        report.created.push(unit);
                        unit
                    }
                    None => continue,
                }
            }
            Resolution::Missing => {
                report.missing.push(device.circuit.clone());
                continue;
            }
        };

        let (Some(s_value), Some(n_value)) = (device.display_value(), device.rounded_value()) else {
            info!(circuit = %device.circuit, unit, "no value from device");
            report.no_value.push(device.circuit.clone());
            continue;
        };

        match update_device(repo, unit, n_value, &s_value) {
            UpdateOutcome::Updated => report.updated.push(unit),
            UpdateOutcome::Unchanged => report.unchanged += 1,
            UpdateOutcome::Gone => {}
        }
    }

    report
}

fn create_sensor(repo: &impl DeviceRepository, device: &RemoteDevice) -> Option<Unit> {
    let unit = repo.next_unit();
    let spec = DeviceSpec::from_class(
        unit,
        format!("Temp {unit}"),
        classify(&DeviceKind::Temp),
        &device.circuit,
    );
    match repo.create(spec) {
        Ok(unit) => {
            info!(unit, circuit = %device.circuit, "created new temperature device");
            Some(unit)
        }
        Err(e) => {
            warn!(unit, circuit = %device.circuit, error = %e, "could not create temperature device");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::hub::DeviceTable;
    use crate::kinds::classify;

    fn seed(table: &DeviceTable, unit: Unit, kind: &DeviceKind, circuit: &str) {
        let class = classify(kind);
        table
            .create(DeviceSpec::from_class(unit, format!("{} {circuit}", class.prefix), class, circuit))
            .unwrap();
    }

    // ── Creation pass ────────────────────────────────────────────────

    #[test]
    fn startup_consumes_a_unit_per_device_and_skips_unsupported() {
        let table = DeviceTable::new();
        let remote = vec![
            RemoteDevice::new("1_01", DeviceKind::Input, None),
            RemoteDevice::new("2_01", DeviceKind::Relay, None),
            RemoteDevice::new("x", DeviceKind::Watchdog, None),
        ];

        let report = create_initial_devices(&remote, &table);

        assert_eq!(report.units_consumed, 3);
        assert_eq!(report.created, vec![1, 2]);
        assert_eq!(report.unsupported, vec!["x".to_string()]);

        let input = table.get(1).unwrap();
        assert_eq!(input.name, "Input 1_01");
        assert_eq!((input.device_type, input.subtype, input.switch_type), (244, 62, 0));
        assert_eq!(input.device_id, "1_01");

        let relay = table.get(2).unwrap();
        assert_eq!(relay.name, "Relay 2_01");
        assert_eq!((relay.device_type, relay.subtype, relay.switch_type), (244, 73, 2));
        assert!(table.get(3).is_none());
    }

    #[test]
    fn unsupported_device_in_the_middle_leaves_a_gap() {
        let table = DeviceTable::new();
        let remote = vec![
            RemoteDevice::new("1", DeviceKind::Neuron, None),
            RemoteDevice::new("1_01", DeviceKind::Input, None),
        ];

        let report = create_initial_devices(&remote, &table);
        assert_eq!(report.created, vec![2]);
        assert!(table.get(1).is_none());
    }

    // ── Reconciliation pass ──────────────────────────────────────────

    #[test]
    fn changed_value_is_written_exactly_once() {
        let table = DeviceTable::new();
        seed(&table, 1, &DeviceKind::Input, "1_01");
        let remote = vec![RemoteDevice::new("1_01", DeviceKind::Input, Some(1.0))];

        let before = table.version();
        let report = reconcile(&remote, &table);

        assert_eq!(report.updated, vec![1]);
        assert_eq!(table.version(), before + 1);
        let record = table.get(1).unwrap();
        assert_eq!((record.n_value, record.s_value.as_str()), (1, "1.0"));
    }

    #[test]
    fn second_pass_with_same_data_writes_nothing() {
        let table = DeviceTable::new();
        seed(&table, 1, &DeviceKind::Input, "1_01");
        seed(&table, 2, &DeviceKind::Temp, "28A");
        let remote = vec![
            RemoteDevice::new("1_01", DeviceKind::Input, Some(1.0)),
            RemoteDevice::new("28A", DeviceKind::Temp, Some(21.5)),
        ];

        reconcile(&remote, &table);
        let after_first = table.version();
        let report = reconcile(&remote, &table);

        assert_eq!(table.version(), after_first);
        assert!(!report.wrote());
        assert_eq!(report.unchanged, 2);
    }

    #[test]
    fn relays_and_other_kinds_are_not_live_updated() {
        let table = DeviceTable::new();
        seed(&table, 1, &DeviceKind::Relay, "2_01");
        seed(&table, 2, &DeviceKind::AnalogInput, "1_01");
        let remote = vec![
            RemoteDevice::new("2_01", DeviceKind::Relay, Some(1.0)),
            RemoteDevice::new("1_01", DeviceKind::AnalogInput, Some(4.2)),
        ];

        let before = table.version();
        let report = reconcile(&remote, &table);

        assert_eq!(report, SyncReport::default());
        assert_eq!(table.version(), before);
    }

    #[test]
    fn input_circuit_matches_sensor_record_not_relay_with_same_id() {
        let table = DeviceTable::new();
        seed(&table, 1, &DeviceKind::Relay, "1_01");
        seed(&table, 2, &DeviceKind::Input, "1_01");
        let remote = vec![RemoteDevice::new("1_01", DeviceKind::Input, Some(1.0))];

        let report = reconcile(&remote, &table);

        assert_eq!(report.updated, vec![2]);
        assert_eq!(table.get(1).unwrap().n_value, 0);
    }

    #[test]
    fn ambiguous_circuit_is_skipped_and_reported() {
        let table = DeviceTable::new();
        seed(&table, 1, &DeviceKind::Input, "1_01");
        seed(&table, 2, &DeviceKind::Input, "1_01");
        let remote = vec![RemoteDevice::new("1_01", DeviceKind::Input, Some(1.0))];

        let before = table.version();
        let report = reconcile(&remote, &table);

        assert_eq!(report.ambiguous, vec!["1_01".to_string()]);
        assert_eq!(table.version(), before);
    }

    #[test]
    fn ambiguous_temperature_is_not_recreated() {
        let table = DeviceTable::new();
        seed(&table, 1, &DeviceKind::Temp, "28A");
        seed(&table, 2, &DeviceKind::Temp, "28A");
        let remote = vec![RemoteDevice::new("28A", DeviceKind::Temp, Some(20.0))];

        let report = reconcile(&remote, &table);

        assert!(report.created.is_empty());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn missing_input_is_skipped() {
        let table = DeviceTable::new();
        seed(&table, 1, &DeviceKind::Input, "1_01");
        let remote = vec![RemoteDevice::new("1_02", DeviceKind::Input, Some(1.0))];

        let before = table.version();
        let report = reconcile(&remote, &table);

        assert_eq!(report.missing, vec!["1_02".to_string()]);
        assert_eq!(table.version(), before);
    }

    #[test]
    fn unseen_temperature_sensor_is_created_after_highest_unit() {
        let table = DeviceTable::new();
        seed(&table, 1, &DeviceKind::Input, "1_01");
        seed(&table, 5, &DeviceKind::Relay, "2_01");
        let remote = vec![RemoteDevice::new("28FF", DeviceKind::Temp, Some(19.25))];

        let report = reconcile(&remote, &table);

        assert_eq!(report.created, vec![6]);
        assert_eq!(report.updated, vec![6]);
        let sensor = table.get(6).unwrap();
        assert_eq!(sensor.name, "Temp 6");
        assert_eq!((sensor.device_type, sensor.subtype), (80, 5));
        assert_eq!(sensor.device_id, "28FF");
        assert_eq!((sensor.n_value, sensor.s_value.as_str()), (19, "19.25"));
    }

    #[test]
    fn null_value_keeps_stored_state() {
        let table = DeviceTable::new();
        seed(&table, 1, &DeviceKind::Temp, "28A");
        table.update(1, 21, "21.0").unwrap();
        let remote = vec![RemoteDevice::new("28A", DeviceKind::Temp, None)];

        let before = table.version();
        let report = reconcile(&remote, &table);

        assert_eq!(report.no_value, vec!["28A".to_string()]);
        assert_eq!(table.version(), before);
        assert_eq!(table.get(1).unwrap().s_value, "21.0");
    }

    #[test]
    fn string_change_alone_triggers_update() {
        let table = DeviceTable::new();
        seed(&table, 1, &DeviceKind::Temp, "28A");
        table.update(1, 21, "21.25").unwrap();
        let remote = vec![RemoteDevice::new("28A", DeviceKind::Temp, Some(21.3))];

        let report = reconcile(&remote, &table);

        assert_eq!(report.updated, vec![1]);
        assert_eq!(table.get(1).unwrap().s_value, "21.3");
    }

    #[test]
    fn update_of_deleted_unit_is_tolerated() {
        let table = DeviceTable::new();
        assert_eq!(update_device(&table, 42, 1, "1"), UpdateOutcome::Gone);
    }
}
