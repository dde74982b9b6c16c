// ── Kind classification table ──
//
// Maps each EVOK device kind to the hub's (name prefix, type, subtype,
// switch type) classification. A zero type marks the kind as unsupported for
// record creation. The relay/sensor role split is derived from this table.

use serde::Serialize;
use strum::{AsRefStr, Display};

use unipi_api::DeviceKind;

/// Hub classification for one device kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindClass {
    pub prefix: &'static str,
    pub device_type: u8,
    pub subtype: u8,
    pub switch_type: u8,
}

impl KindClass {
    const fn new(prefix: &'static str, device_type: u8, subtype: u8, switch_type: u8) -> Self {
        Self {
            prefix,
            device_type,
            subtype,
            switch_type,
        }
    }

    pub const UNSUPPORTED: Self = Self::new("Unsupported", 0, 0, 0);

    pub fn is_supported(&self) -> bool {
        self.device_type != 0
    }
}

/// Classification for a kind. Unknown kinds are unsupported.
pub fn classify(kind: &DeviceKind) -> KindClass {
    match kind {
        DeviceKind::Input => KindClass::new("Input", 244, 62, 0),
        DeviceKind::Temp => KindClass::new("Temp", 80, 5, 0),
        DeviceKind::Relay => KindClass::new("Relay", 244, 73, 2),
        DeviceKind::AnalogInput => KindClass::new("Analog Input", 243, 8, 0),
        DeviceKind::AnalogOutput => KindClass::new("Analog Output", 244, 62, 7),
        DeviceKind::Led => KindClass::new("ULED", 244, 73, 18),
        DeviceKind::Watchdog => KindClass::new("Watch Dog", 0, 0, 0),
        DeviceKind::Neuron => KindClass::new("Evok Devices", 0, 0, 0),
        DeviceKind::Uart => KindClass::new("UART Serial Port", 0, 0, 0),
        DeviceKind::Unknown(_) => KindClass::UNSUPPORTED,
    }
}

/// Subtype that marks a hub record as a relay/output.
pub fn relay_subtype() -> u8 {
    classify(&DeviceKind::Relay).subtype
}

/// Which side of the circuit namespace a hub record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// Inputs and sensors, mirrored from the controller.
    Sensor,
    /// Relays and other outputs, driven by hub commands.
    Relay,
}

impl Role {
    pub fn of_subtype(subtype: u8) -> Self {
        if subtype == relay_subtype() {
            Self::Relay
        } else {
            Self::Sensor
        }
    }
}
