// EVOK REST response types
//
// `/rest/all` returns a flat JSON array of every I/O point the controller
// knows about. Each entry carries many kind-specific fields; only `circuit`,
// `dev` and `value` are modelled here, everything else is ignored.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use strum::EnumString;

// ── Device kind ──────────────────────────────────────────────────────

/// Device category as reported in the `dev` field.
///
/// Unknown categories (newer firmware adds them regularly) decode into
/// [`DeviceKind::Unknown`] instead of failing the whole payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DeviceKind {
    #[strum(serialize = "input")]
    Input,
    #[strum(serialize = "temp")]
    Temp,
    #[strum(serialize = "relay")]
    Relay,
    #[strum(serialize = "ai")]
    AnalogInput,
    #[strum(serialize = "ao")]
    AnalogOutput,
    #[strum(serialize = "led")]
    Led,
    #[strum(serialize = "wd")]
    Watchdog,
    #[strum(serialize = "neuron", serialize = "neuro")]
    Neuron,
    #[strum(serialize = "uart")]
    Uart,
    #[strum(default)]
    Unknown(String),
}

impl DeviceKind {
    /// The wire name used by EVOK (`"input"`, `"temp"`, ...).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Input => "input",
            Self::Temp => "temp",
            Self::Relay => "relay",
            Self::AnalogInput => "ai",
            Self::AnalogOutput => "ao",
            Self::Led => "led",
            Self::Watchdog => "wd",
            Self::Neuron => "neuron",
            Self::Uart => "uart",
            Self::Unknown(raw) => raw,
        }
    }

    /// Kinds whose value is mirrored on every poll.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Input | Self::Temp)
    }
}

impl From<String> for DeviceKind {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or(Self::Unknown(raw))
    }
}

impl From<DeviceKind> for String {
    fn from(kind: DeviceKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Remote device ────────────────────────────────────────────────────

/// One I/O point as reported by the controller.
///
/// Rebuilt on every fetch and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDevice {
    #[serde(deserialize_with = "string_or_number")]
    pub circuit: String,
    pub dev: DeviceKind,
    /// Raw reading. Kept as a JSON number so its text form matches the
    /// controller's own rendering (`1`, `21.5`, `21.0`).
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<serde_json::Number>,
}

impl RemoteDevice {
    pub fn new(circuit: impl Into<String>, dev: DeviceKind, value: Option<f64>) -> Self {
        Self {
            circuit: circuit.into(),
            dev,
            value: value.and_then(serde_json::Number::from_f64),
        }
    }

    /// Text form of the reading, e.g. `"21.5"`.
    pub fn display_value(&self) -> Option<String> {
        self.value.as_ref().map(ToString::to_string)
    }

    /// Reading rounded to the nearest integer, ties to even.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn rounded_value(&self) -> Option<i64> {
        let number = self.value.as_ref()?;
        if let Some(i) = number.as_i64() {
            return Some(i);
        }
        number.as_f64().map(|f| f.round_ties_even() as i64)
    }
}

/// Some firmware reports numeric circuits for controller-level devices.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number circuit, got {other}"
        ))),
    }
}

/// `null`, the string `"null"`, and any non-numeric value all mean "no reading".
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<serde_json::Number>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => Ok(Some(n)),
        _ => Ok(None),
    }
}

// ── Response envelope ────────────────────────────────────────────────

/// EVOK 1.x answers with a bare payload, 2.x wraps it in `{"data": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}
