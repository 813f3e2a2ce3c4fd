// ── Device domain types ──

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── DeviceId ────────────────────────────────────────────────────────

/// Stable identifier of a managed device.
///
/// The backend numbers devices by window slot; the number is kept in its
/// decimal string form so string and integer ids compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DeviceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

impl From<String> for DeviceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<u32> for DeviceId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

// ── Device ──────────────────────────────────────────────────────────

/// A remote mobile device under management.
///
/// `status` is whatever label the backend uses (`online`, `offline`,
/// `connecting`, ...); the client never interprets it. Reachability is
/// the separate `connected` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DeviceId,
    pub status: String,
    pub connected: bool,
    pub last_update: Option<DateTime<Utc>>,

    pub ip: Option<IpAddr>,
    pub port: Option<u16>,
    pub name: Option<String>,
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
}

impl Device {
    /// A device with no descriptive metadata, as seen before the first scan.
    pub fn new(id: impl Into<DeviceId>, status: impl Into<String>, connected: bool) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            connected,
            last_update: None,
            ip: None,
            port: None,
            name: None,
            screen_width: None,
            screen_height: None,
        }
    }

    pub fn is_online(&self) -> bool {
        self.connected
    }

    /// Screen resolution, when the backend probed it.
    pub fn resolution(&self) -> Option<(u32, u32)> {
        self.screen_width.zip(self.screen_height)
    }

    /// Display label: the device name, falling back to `ip:port`, then the id.
    pub fn label(&self) -> String {
        if let Some(ref name) = self.name {
            return name.clone();
        }
        match (self.ip, self.port) {
            (Some(ip), Some(port)) => format!("{ip}:{port}"),
            (Some(ip), None) => ip.to_string(),
            _ => format!("device {}", self.id),
        }
    }

    /// Apply a status change, stamping `last_update` with `now`.
    ///
    /// The stamp never moves backwards: if the wall clock stepped back
    /// since the previous update, the previous stamp is kept.
    pub(crate) fn apply_status(&mut self, status: String, connected: bool, now: DateTime<Utc>) {
        self.status = status;
        self.connected = connected;
        self.last_update = Some(self.last_update.map_or(now, |prev| prev.max(now)));
    }
}
