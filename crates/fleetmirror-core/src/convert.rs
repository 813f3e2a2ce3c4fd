// ── Wire → domain conversions ──
//
// Bridges raw `fleetmirror-api` records into canonical domain types.

use chrono::DateTime;
use tracing::debug;

use fleetmirror_api::models::{DeviceRecord, FrameMessage, StatusRecord};

use crate::model::{Device, DeviceId, Frame, SystemStatusUpdate};

impl From<DeviceRecord> for Device {
    fn from(r: DeviceRecord) -> Self {
        let ip = r.ip.as_deref().and_then(|raw| match raw.parse() {
            Ok(ip) => Some(ip),
            Err(_) => {
                debug!(device_id = %r.id, ip = raw, "ignoring unparseable device address");
                None
            }
        });

        Device {
            id: DeviceId::from(r.id),
            status: r.status,
            connected: r.connected,
            last_update: r.last_update.and_then(DateTime::from_timestamp_millis),
            ip,
            port: r.port,
            name: r.device_name.filter(|n| !n.is_empty()),
            screen_width: r.screen_width,
            screen_height: r.screen_height,
        }
    }
}

impl From<StatusRecord> for SystemStatusUpdate {
    fn from(r: StatusRecord) -> Self {
        SystemStatusUpdate {
            device_count: r.device_count,
            active_connections: r.active_connections,
            active_sessions: r.active_sessions,
        }
    }
}

impl From<FrameMessage> for Frame {
    fn from(m: FrameMessage) -> Self {
        Frame {
            device_id: DeviceId::from(m.device_id),
            image: m.image,
            timestamp: m.timestamp,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record() -> DeviceRecord {
        DeviceRecord {
            id: "7".into(),
            status: "online".into(),
            connected: true,
            last_update: Some(1_760_000_000_000),
            ip: Some("192.168.31.107".into()),
            port: Some(9801),
            device_name: Some(String::new()),
            screen_width: Some(1080),
            screen_height: Some(2400),
        }
    }

    #[test]
    fn device_record_converts() {
        let device = Device::from(record());
        assert_eq!(device.id.as_str(), "7");
        assert_eq!(device.ip, Some("192.168.31.107".parse().unwrap()));
        assert_eq!(device.name, None);
        assert_eq!(device.resolution(), Some((1080, 2400)));
        assert_eq!(
            device.last_update.unwrap().timestamp_millis(),
            1_760_000_000_000
        );
    }

    #[test]
    fn bad_address_is_dropped() {
        let mut r = record();
        r.ip = Some("not-an-ip".into());
        assert_eq!(Device::from(r).ip, None);
    }
}
