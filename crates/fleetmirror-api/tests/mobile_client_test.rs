// Integration tests for `MobileClient` using wiremock.
#![allow(clippy::unwrap_used)]

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fleetmirror_api::models::{NetworkConfigRequest, ScanRangeRequest};
use fleetmirror_api::{Error, FailureKind, MobileClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, MobileClient) {
    let server = MockServer::start().await;
    let base = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = MobileClient::with_client(reqwest::Client::new(), base);
    (server, client)
}

fn device_json(id: u32, status: &str, connected: bool) -> serde_json::Value {
    json!({
        "id": id,
        "ip": format!("192.168.31.{id}"),
        "port": 9801,
        "status": status,
        "connected": connected,
        "lastUpdate": 1_760_000_000_000_i64,
        "deviceName": null,
        "screenWidth": null,
        "screenHeight": null
    })
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/mobile/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "devices": [device_json(1, "online", true), device_json(2, "offline", false)],
            "count": 2
        })))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id, "1");
    assert_eq!(devices[0].ip.as_deref(), Some("192.168.31.1"));
    assert!(devices[0].connected);
    assert_eq!(devices[1].status, "offline");
}

#[tokio::test]
async fn test_get_device_present_and_absent() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/mobile/devices/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "device": device_json(4, "online", true)
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/mobile/devices/99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "device does not exist"
        })))
        .mount(&server)
        .await;

    let device = client.get_device("4").await.unwrap().unwrap();
    assert_eq!(device.id, "4");

    assert!(client.get_device("99").await.unwrap().is_none());
}

#[tokio::test]
async fn test_scan_network() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/mobile/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "scan complete",
            "devices": [device_json(1, "online", true)],
            "count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let scan = client.scan_network().await.unwrap();
    assert_eq!(scan.count, Some(1));
    assert_eq!(scan.devices.len(), 1);
    assert_eq!(scan.message.as_deref(), Some("scan complete"));
}

#[tokio::test]
async fn test_scan_range_sends_bounds() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/mobile/scan/batch"))
        .and(body_json(json!({ "baseIp": "10.0.0", "startRange": 10, "endRange": 20 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "devices": [],
            "count": 0,
            "range": "10.0.0.10-20"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let scan = client
        .scan_range(&ScanRangeRequest {
            base_ip: "10.0.0".into(),
            start_range: 10,
            end_range: 20,
        })
        .await
        .unwrap();

    assert!(scan.devices.is_empty());
    assert_eq!(scan.range.as_deref(), Some("10.0.0.10-20"));
}

#[tokio::test]
async fn test_remove_device() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/mobile/devices/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "device removed" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.remove_device("2").await.unwrap();
}

#[tokio::test]
async fn test_device_id_with_slash_stays_on_device_endpoint() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/mobile/devices/..%2Fstatus"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "device removed" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/mobile/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    client.remove_device("../status").await.unwrap();
}

#[tokio::test]
async fn test_dot_device_id_is_refused_locally() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.get_device("..").await.unwrap_err();
    assert!(matches!(err, Error::InvalidDeviceId(ref id) if id == ".."));
}

#[tokio::test]
async fn test_update_network_config() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/mobile/config/network"))
        .and(body_json(json!({
            "baseIp": "192.168.1",
            "startRange": 0,
            "endRange": 100,
            "detectPort": 9801,
            "streamPort": 9802
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_network_config(&NetworkConfigRequest {
            base_ip: "192.168.1".into(),
            start_range: 0,
            end_range: 100,
            detect_port: Some(9801),
            stream_port: Some(9802),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_system_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/mobile/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": {
                "deviceCount": 5,
                "activeConnections": 3,
                "activeSessions": 1,
                "timestamp": 1_760_000_000_000_i64
            }
        })))
        .mount(&server)
        .await;

    let status = client.system_status().await.unwrap();
    assert_eq!(status.device_count, Some(5));
    assert_eq!(status.active_connections, Some(3));
    assert_eq!(status.active_sessions, Some(1));
}

// ── Error classification ────────────────────────────────────────────

#[tokio::test]
async fn test_http_statuses_are_classified() {
    let (server, client) = setup().await;

    for (code, kind) in [
        (400, FailureKind::Parameter),
        (401, FailureKind::Unauthorized),
        (403, FailureKind::Forbidden),
        (404, FailureKind::NotFound),
        (500, FailureKind::Server),
        (503, FailureKind::Server),
    ] {
        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/api/mobile/status"))
            .respond_with(ResponseTemplate::new(code).set_body_json(json!({
                "success": false,
                "message": format!("failure {code}")
            })))
            .mount(&server)
            .await;

        let err = client.system_status().await.unwrap_err();
        match err {
            Error::Api {
                kind: got,
                status,
                ref message,
            } => {
                assert_eq!(got, kind, "status {code}");
                assert_eq!(status, code);
                assert_eq!(message, &format!("failure {code}"));
            }
            other => panic!("expected Api error for {code}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_error_without_json_body_uses_reason_phrase() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/mobile/devices/1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client.remove_device("1").await.unwrap_err();
    assert!(
        matches!(err, Error::Api { status: 500, ref message, .. } if message == "Internal Server Error")
    );
}

#[tokio::test]
async fn test_success_false_is_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/mobile/config/network"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "update failed: disk full"
        })))
        .mount(&server)
        .await;

    let err = client
        .update_network_config(&NetworkConfigRequest {
            base_ip: "192.168.31".into(),
            start_range: 0,
            end_range: 255,
            detect_port: None,
            stream_port: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Rejected { ref message } if message == "update failed: disk full"));
    assert_eq!(err.failure_kind(), Some(FailureKind::Server));
}

#[tokio::test]
async fn test_network_failure_is_classified() {
    // Nothing listens on port 9 locally.
    let client = MobileClient::with_client(
        reqwest::Client::new(),
        Url::parse("http://127.0.0.1:9/api").unwrap(),
    );

    let err = client.list_devices().await.unwrap_err();
    assert_eq!(err.failure_kind(), Some(FailureKind::Network));
}
