// REST command transport
//
// Wraps `reqwest::Client` with URL construction under the backend's
// `/mobile` prefix, status classification, and `{success, message, ...}`
// envelope unwrapping. Every method is a single request/response call.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Error, FailureKind};
use crate::models::{
    Ack, DeviceListResponse, DeviceRecord, DeviceResponse, NetworkConfigRequest,
    ScanRangeRequest, ScanResponse, StatusRecord, StatusResponse,
};
use crate::transport::TransportConfig;

/// HTTP client for the fleet backend's command endpoints.
///
/// `base_url` is the API root, e.g. `http://localhost:8080/api`. All paths
/// below are resolved relative to it.
pub struct MobileClient {
    http: reqwest::Client,
    base_url: Url,
}

impl MobileClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Run a full network scan. Blocks server-side until the scan completes.
    ///
    /// `POST /mobile/scan`
    pub async fn scan_network(&self) -> Result<ScanResponse, Error> {
        debug!("requesting full network scan");
        let url = self.api_url(&["mobile", "scan"])?;
        self.send(self.http.post(url)).await
    }

    /// Scan a sub-range of the configured network.
    ///
    /// `POST /mobile/scan/batch`
    pub async fn scan_range(&self, request: &ScanRangeRequest) -> Result<ScanResponse, Error> {
        debug!(
            base_ip = %request.base_ip,
            start = request.start_range,
            end = request.end_range,
            "requesting ranged network scan"
        );
        let url = self.api_url(&["mobile", "scan", "batch"])?;
        self.send(self.http.post(url).json(request)).await
    }

    /// List every device the backend knows about.
    ///
    /// `GET /mobile/devices`
    pub async fn list_devices(&self) -> Result<Vec<DeviceRecord>, Error> {
        let url = self.api_url(&["mobile", "devices"])?;
        let resp: DeviceListResponse = self.send(self.http.get(url)).await?;
        Ok(resp.devices)
    }

    /// Fetch one device. Returns `None` when the backend reports it absent.
    ///
    /// `GET /mobile/devices/{id}`
    pub async fn get_device(&self, id: &str) -> Result<Option<DeviceRecord>, Error> {
        let url = self.device_url(id)?;
        debug!("GET {}", url);

        let value = self.send_raw(self.http.get(url)).await?;
        if !is_success(&value) {
            debug!(id, "device not known to backend");
            return Ok(None);
        }
        let resp: DeviceResponse = deserialize(value)?;
        Ok(Some(resp.device))
    }

    /// Forget a device on the backend.
    ///
    /// `DELETE /mobile/devices/{id}`
    pub async fn remove_device(&self, id: &str) -> Result<(), Error> {
        debug!(id, "removing device");
        let url = self.device_url(id)?;
        let _: Ack = self.send(self.http.delete(url)).await?;
        Ok(())
    }

    /// Replace the backend's scan configuration.
    ///
    /// `POST /mobile/config/network`
    pub async fn update_network_config(&self, config: &NetworkConfigRequest) -> Result<(), Error> {
        debug!(base_ip = %config.base_ip, "updating network config");
        let url = self.api_url(&["mobile", "config", "network"])?;
        let _: Ack = self.send(self.http.post(url).json(config)).await?;
        Ok(())
    }

    /// Fetch aggregate counters.
    ///
    /// `GET /mobile/status`
    pub async fn system_status(&self) -> Result<StatusRecord, Error> {
        let url = self.api_url(&["mobile", "status"])?;
        let resp: StatusResponse = self.send(self.http.get(url)).await?;
        Ok(resp.status)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Append `segments` below the base URL, keeping the base path intact.
    ///
    /// Each segment is percent-encoded on its own, so `/`, `?` and `#`
    /// inside a segment never change the endpoint.
    pub(crate) fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `mobile/devices/{id}` with the id confined to one path segment.
    fn device_url(&self, id: &str) -> Result<Url, Error> {
        // Dot segments are collapsed by URL normalisation and cannot be addressed.
        if id.is_empty() || id.chars().all(|c| c == '.') {
            return Err(Error::InvalidDeviceId(id.to_owned()));
        }
        self.api_url(&["mobile", "devices", id])
    }

    /// Send a request and unwrap the envelope into `T`.
    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, Error> {
        let value = self.send_raw(request).await?;
        if !is_success(&value) {
            return Err(Error::Rejected {
                message: server_message(&value).unwrap_or_else(|| "request failed".into()),
            });
        }
        deserialize(value)
    }

    /// Send a request, classify non-2xx statuses, and parse the body as JSON.
    async fn send_raw(&self, request: reqwest::RequestBuilder) -> Result<Value, Error> {
        let resp = request.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| server_message(&v))
                .or_else(|| status.canonical_reason().map(str::to_owned))
                .unwrap_or_default();
            return Err(Error::Api {
                kind: FailureKind::from_status(status.as_u16()),
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// The backend omits `success` on some payloads; absence means success.
fn is_success(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool).unwrap_or(true)
}

fn server_message(value: &Value) -> Option<String> {
    value.get("message").and_then(Value::as_str).map(str::to_owned)
}

fn deserialize<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    T::deserialize(&value).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: value.to_string(),
    })
}
