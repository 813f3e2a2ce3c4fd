// ── Aggregate status and scan configuration ──
//
// Both are merged field-wise: an update only overwrites the fields it
// carries, never zeroes the rest.

use serde::{Deserialize, Serialize};

// ── SystemStatus ────────────────────────────────────────────────────

/// Backend-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub device_count: u32,
    pub active_connections: u32,
    pub active_sessions: u32,
}

/// Partial [`SystemStatus`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatusUpdate {
    pub device_count: Option<u32>,
    pub active_connections: Option<u32>,
    pub active_sessions: Option<u32>,
}

impl SystemStatus {
    /// Overwrite the fields present in `update`. Returns `true` if anything changed.
    pub fn merge(&mut self, update: &SystemStatusUpdate) -> bool {
        let before = *self;
        if let Some(v) = update.device_count {
            self.device_count = v;
        }
        if let Some(v) = update.active_connections {
            self.active_connections = v;
        }
        if let Some(v) = update.active_sessions {
            self.active_sessions = v;
        }
        *self != before
    }
}

// ── NetworkConfig ───────────────────────────────────────────────────

/// LAN scan configuration: devices are probed at
/// `{base_ip}.{start_range..=end_range}` on `detect_port`, screens are
/// streamed from `stream_port`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub base_ip: String,
    pub start_range: u32,
    pub end_range: u32,
    pub detect_port: u16,
    pub stream_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_ip: "192.168.31".into(),
            start_range: 0,
            end_range: 255,
            detect_port: 9801,
            stream_port: 9802,
        }
    }
}

/// Partial [`NetworkConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfigUpdate {
    pub base_ip: Option<String>,
    pub start_range: Option<u32>,
    pub end_range: Option<u32>,
    pub detect_port: Option<u16>,
    pub stream_port: Option<u16>,
}

impl NetworkConfig {
    /// Overwrite the fields present in `update`. Returns `true` if anything changed.
    pub fn merge(&mut self, update: &NetworkConfigUpdate) -> bool {
        let before = self.clone();
        if let Some(ref v) = update.base_ip {
            self.base_ip.clone_from(v);
        }
        if let Some(v) = update.start_range {
            self.start_range = v;
        }
        if let Some(v) = update.end_range {
            self.end_range = v;
        }
        if let Some(v) = update.detect_port {
            self.detect_port = v;
        }
        if let Some(v) = update.stream_port {
            self.stream_port = v;
        }
        *self != before
    }

    /// Human-readable scan range, e.g. `192.168.31.0-255`.
    pub fn range_label(&self) -> String {
        format!("{}.{}-{}", self.base_ip, self.start_range, self.end_range)
    }
}

impl NetworkConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
