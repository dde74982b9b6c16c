// ── Hub-side inputs ──
//
// Everything the hub can push into the bridge besides the start and
// heartbeat triggers: device commands and the informational callbacks.

use strum::{AsRefStr, Display};

use crate::hub::Unit;

/// A relay command coming from the hub.
///
/// The hub sends free-form command strings. Only the exact literal `"Off"`
/// switches a relay off; every other literal (`"On"`, `"Toggle"`,
/// `"Set Level"`, ...) is treated as `On`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum RelayCommand {
    On,
    Off,
}

impl RelayCommand {
    pub fn parse(raw: &str) -> Self {
        if raw == "Off" { Self::Off } else { Self::On }
    }

    /// Value written to the controller.
    pub fn value(self) -> u8 {
        match self {
            Self::On => 1,
            Self::Off => 0,
        }
    }
}

/// A hub notification, logged verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    pub name: String,
    pub subject: String,
    pub text: String,
    pub status: String,
    pub priority: i32,
    pub sound: String,
    pub image_file: String,
}

/// An event delivered to the bridge between heartbeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    Command {
        unit: Unit,
        command: String,
        level: i32,
    },
    Connect {
        status: i32,
        description: String,
    },
    Message(String),
    Notification(Notification),
    Disconnect,
}

impl HubEvent {
    /// Parse a command line of the form `UNIT COMMAND [LEVEL]`, e.g. `3 Off`.
    ///
    /// Returns `None` for blank or malformed lines.
    pub fn parse_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let unit = parts.next()?.parse().ok()?;
        let command = parts.next()?.to_owned();
        let level = match parts.next() {
            Some(raw) => raw.parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self::Command {
            unit,
            command,
            level,
        })
    }
}
