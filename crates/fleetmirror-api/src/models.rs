// Wire models shared by the event stream and the REST command transport.
//
// These mirror the backend's JSON exactly (camelCase, loose typing).
// `fleetmirror-core` converts them into canonical domain types.

use serde::{Deserialize, Deserializer, Serialize};

// ── Devices ──────────────────────────────────────────────────────────

/// A device record as the backend serializes it.
///
/// The backend numbers devices by window slot and sends `id` as a JSON
/// integer; string ids are accepted too and both normalise to `String`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,

    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default)]
    pub connected: bool,

    /// Epoch milliseconds.
    pub last_update: Option<i64>,

    pub ip: Option<String>,
    pub port: Option<u16>,
    pub device_name: Option<String>,
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
}

fn default_status() -> String {
    "offline".into()
}

// ── Event stream messages ────────────────────────────────────────────

/// `{"type": "frame", ...}` -- one screen capture.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameMessage {
    #[serde(deserialize_with = "de_id")]
    pub device_id: String,

    /// Encoded image, normally a `data:image/jpeg;base64,...` URL.
    pub image: String,

    /// Capture time in epoch milliseconds.
    #[serde(deserialize_with = "de_millis")]
    pub timestamp: i64,
}

/// `{"type": "device_status", ...}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatusMessage {
    #[serde(deserialize_with = "de_id")]
    pub device_id: String,
    pub status: String,
    pub connected: bool,
}

/// `{"type": "device_list", ...}` -- authoritative full snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceListMessage {
    pub devices: Vec<DeviceRecord>,
}

// ── REST payloads ────────────────────────────────────────────────────

/// Body of `GET /mobile/devices`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceListResponse {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
    pub count: Option<usize>,
}

/// Body of `GET /mobile/devices/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceResponse {
    pub device: DeviceRecord,
}

/// Body of `POST /mobile/scan` and `POST /mobile/scan/batch`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanResponse {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
    pub count: Option<usize>,
    pub message: Option<String>,
    /// Only present for ranged scans, e.g. `"192.168.31.0-20"`.
    pub range: Option<String>,
}

/// Body of `GET /mobile/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: StatusRecord,
}

/// Aggregate counters. Every field is optional: partial snapshots are
/// merged by the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    pub device_count: Option<u32>,
    pub active_connections: Option<u32>,
    pub active_sessions: Option<u32>,
    pub timestamp: Option<i64>,
}

/// Acknowledgement body for mutations (`{success, message}`).
#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    pub message: Option<String>,
}

/// Body of `POST /mobile/scan/batch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRangeRequest {
    pub base_ip: String,
    pub start_range: u32,
    pub end_range: u32,
}

/// Body of `POST /mobile/config/network`.
///
/// The server rejects the request unless `base_ip`, `start_range` and
/// `end_range` are all present, so they are not optional here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfigRequest {
    pub base_ip: String,
    pub start_range: u32,
    pub end_range: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_port: Option<u16>,
}

// ── Loose-typing helpers ─────────────────────────────────────────────

/// Accept an identifier sent as either a string or an integer.
fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
    })
}

/// Accept a millisecond timestamp sent as an integer or a float.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn de_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMillis {
        Int(i64),
        Float(f64),
    }

    Ok(match RawMillis::deserialize(deserializer)? {
        RawMillis::Int(n) => n,
        RawMillis::Float(f) => f.round() as i64,
    })
}
