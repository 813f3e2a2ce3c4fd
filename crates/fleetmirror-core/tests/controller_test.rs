// Integration tests for `Controller` against a wiremock backend.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::{self, StreamExt};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fleetmirror_api::{Connector, Error, Inbound, InboundStream, Payload};
use fleetmirror_core::{
    Command, CommandResult, Controller, CoreError, DeviceId, FleetConfig, NetworkConfigUpdate,
    SessionState,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let config = FleetConfig::new(Url::parse(&format!("{}/api", server.uri())).unwrap());
    let controller = Controller::new(config).unwrap();
    (server, controller)
}

fn device_json(id: u32, status: &str, connected: bool) -> serde_json::Value {
    json!({
        "id": id,
        "ip": format!("192.168.31.{id}"),
        "port": 9801,
        "status": status,
        "connected": connected,
        "lastUpdate": 1_760_000_000_000_i64
    })
}

async fn mount_list(server: &MockServer, devices: Vec<serde_json::Value>) {
    let count = devices.len();
    Mock::given(method("GET"))
        .and(path("/api/mobile/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "devices": devices,
            "count": count
        })))
        .mount(server)
        .await;
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_devices_replaces_registry() {
    let (server, controller) = setup().await;
    controller
        .registry()
        .upsert_device(fleetmirror_core::Device::new("stale", "online", true));

    mount_list(
        &server,
        vec![device_json(1, "online", true), device_json(2, "offline", false)],
    )
    .await;

    let table = controller.refresh_devices().await.unwrap();

    assert_eq!(table.len(), 2);
    assert!(!table.contains(&DeviceId::from("stale")));
    assert_eq!(controller.registry().online_device_count(), 1);
}

#[tokio::test]
async fn device_lookup_upserts_or_reports_missing() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/mobile/devices/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "device": device_json(3, "online", true)
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/mobile/devices/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "device does not exist"
        })))
        .mount(&server)
        .await;

    let device = controller.device(&DeviceId::from("3")).await.unwrap();
    assert_eq!(device.port, Some(9801));
    assert_eq!(controller.registry().device_count(), 1);

    let err = controller.device(&DeviceId::from("9")).await.unwrap_err();
    assert!(matches!(err, CoreError::DeviceNotFound { ref identifier } if identifier == "9"));
}

#[tokio::test]
async fn refresh_status_merges_partial_counters() {
    let (server, controller) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/mobile/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": { "deviceCount": 5, "activeConnections": 3 }
        })))
        .mount(&server)
        .await;

    let status = controller.refresh_status().await.unwrap();
    assert_eq!(status.device_count, 5);
    assert_eq!(status.active_connections, 3);
    assert_eq!(status.active_sessions, 0);
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn scan_replaces_devices_and_clears_flag() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/mobile/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "scan complete",
            "devices": [device_json(4, "online", true)],
            "count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = controller.execute(Command::Scan).await.unwrap();

    let CommandResult::Scan(outcome) = result else {
        panic!("expected scan outcome, got {result:?}");
    };
    assert_eq!(outcome.devices.len(), 1);
    assert_eq!(outcome.message.as_deref(), Some("scan complete"));
    assert_eq!(controller.registry().device_count(), 1);
    assert!(!controller.registry().is_scanning());
}

#[tokio::test]
async fn failed_scan_still_clears_flag() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/mobile/scan"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "message": "scan failed: timeout"
        })))
        .mount(&server)
        .await;

    let err = controller.execute(Command::Scan).await.unwrap_err();
    assert!(matches!(err, CoreError::Server { status: Some(500), .. }));
    assert!(!controller.registry().is_scanning());
}

#[tokio::test]
async fn ranged_scan_upserts_and_validates() {
    let (server, controller) = setup().await;
    controller
        .registry()
        .upsert_device(fleetmirror_core::Device::new("1", "online", true));

    Mock::given(method("POST"))
        .and(path("/api/mobile/scan/batch"))
        .and(body_json(json!({ "baseIp": "192.168.31", "startRange": 2, "endRange": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "devices": [device_json(2, "online", true)],
            "count": 1,
            "range": "192.168.31.2-3"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::ScanRange {
            base_ip: "192.168.31".into(),
            start_range: 2,
            end_range: 3,
        })
        .await
        .unwrap();

    assert!(matches!(result, CommandResult::Scan(ref o) if o.range.as_deref() == Some("192.168.31.2-3")));
    assert_eq!(controller.registry().device_count(), 2);

    let err = controller
        .execute(Command::ScanRange {
            base_ip: "192.168.31".into(),
            start_range: 9,
            end_range: 3,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
}

#[tokio::test]
async fn remove_device_drops_registry_entry() {
    let (server, controller) = setup().await;
    controller
        .registry()
        .set_devices([fleetmirror_core::Device::new("2", "online", true)]);

    Mock::given(method("DELETE"))
        .and(path("/api/mobile/devices/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "device removed" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::RemoveDevice {
            id: DeviceId::from("2"),
        })
        .await
        .unwrap();

    assert_eq!(result, CommandResult::Removed(DeviceId::from("2")));
    assert_eq!(controller.registry().device_count(), 0);
}

#[tokio::test]
async fn remove_unknown_device_surfaces_not_found() {
    let (server, controller) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/mobile/devices/77"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "no such device"
        })))
        .mount(&server)
        .await;

    let err = controller
        .execute(Command::RemoveDevice {
            id: DeviceId::from("77"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { ref message } if message == "no such device"));
}

#[tokio::test]
async fn network_update_sends_merged_config() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/mobile/config/network"))
        .and(body_json(json!({
            "baseIp": "10.1.1",
            "startRange": 0,
            "endRange": 255,
            "detectPort": 9801,
            "streamPort": 9802
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let result = controller
        .execute(Command::UpdateNetworkConfig(NetworkConfigUpdate {
            base_ip: Some("10.1.1".into()),
            ..NetworkConfigUpdate::default()
        }))
        .await
        .unwrap();

    let CommandResult::NetworkConfig(config) = result else {
        panic!("expected network config, got {result:?}");
    };
    assert_eq!(config.base_ip, "10.1.1");
    assert_eq!(controller.network_config(), config);
}

#[tokio::test]
async fn rejected_network_update_leaves_config_untouched() {
    let (server, controller) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/mobile/config/network"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "update failed"
        })))
        .mount(&server)
        .await;

    let err = controller
        .execute(Command::UpdateNetworkConfig(NetworkConfigUpdate {
            detect_port: Some(7000),
            ..NetworkConfigUpdate::default()
        }))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Rejected { .. }));
    assert_eq!(controller.network_config().detect_port, 9801);
}

// ── Event session ───────────────────────────────────────────────────

/// Delivers one device list, then stays open.
struct OneShotConnector;

impl Connector for OneShotConnector {
    fn connect(&self, _url: &Url) -> BoxFuture<'static, Result<InboundStream, Error>> {
        let list = json!({
            "type": "device_list",
            "devices": [
                { "id": 1, "status": "online", "connected": true },
                { "id": 2, "status": "offline", "connected": false }
            ]
        });
        let items: Vec<Result<Inbound, Error>> =
            vec![Ok(Inbound::Payload(Payload::Text(list.to_string())))];
        Box::pin(async move {
            Ok::<InboundStream, Error>(stream::iter(items).chain(stream::pending()).boxed())
        })
    }
}

#[tokio::test]
async fn event_session_feeds_registry_until_disconnect() {
    let (_server, controller) = setup().await;
    let mut devices = controller.devices();

    let mut status = controller
        .connect_events_with(Arc::new(OneShotConnector))
        .await
        .unwrap();

    status
        .wait_for(|s| s.state == SessionState::Open)
        .await
        .unwrap();
    while controller.registry().device_count() < 2 {
        devices.changed().await.unwrap();
    }
    assert!(controller.registry().is_connected());

    // A second start keeps the running session.
    let again = controller
        .connect_events_with(Arc::new(OneShotConnector))
        .await
        .unwrap();
    assert_eq!(again.borrow().generation, 1);

    controller.disconnect().await;
    assert!(!controller.registry().is_connected());
    assert!(controller.session_status().await.is_none());
}
