// ── Controller abstraction ──
//
// Entry point for consumers: owns the registry, the frame relay, the REST
// command client and (once started) the event session. Commands go
// straight to the REST transport; their outcome is folded back into the
// registry so views stay consistent without waiting for the event stream.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info};

use fleetmirror_api::models::{NetworkConfigRequest, ScanRangeRequest, ScanResponse};
use fleetmirror_api::{Connector, MobileClient, WsConnector};

use crate::command::{Command, CommandResult, ScanOutcome};
use crate::config::FleetConfig;
use crate::error::CoreError;
use crate::model::{Device, DeviceId, NetworkConfig, SystemStatus, SystemStatusUpdate};
use crate::relay::{FrameRelay, FrameSubscription};
use crate::session::{SessionHandle, SessionManager, SessionStatus};
use crate::store::{DeviceTable, Registry};
use crate::stream::DeviceStream;

/// Highest host number a ranged scan accepts.
const MAX_HOST: u32 = 255;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: FleetConfig,
    registry: Arc<Registry>,
    relay: FrameRelay,
    client: MobileClient,
    session: Mutex<Option<SessionHandle>>,
}

impl Controller {
    /// Create a controller. Does not connect: REST commands work right
    /// away, the event stream starts with [`connect_events`](Self::connect_events).
    pub fn new(config: FleetConfig) -> Result<Self, CoreError> {
        let client = MobileClient::new(config.server.clone(), &config.transport_config())?;
        let relay = FrameRelay::new(config.frame_buffer);

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                registry: Arc::new(Registry::new()),
                relay,
                client,
                session: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &FleetConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.inner.registry
    }

    // ── Event session ────────────────────────────────────────────────

    /// Start the event session over WebSocket.
    pub async fn connect_events(&self) -> Result<watch::Receiver<SessionStatus>, CoreError> {
        self.connect_events_with(Arc::new(WsConnector)).await
    }

    /// Start the event session with a custom transport. A session that is
    /// already running is kept and its status returned.
    pub async fn connect_events_with<C: Connector + ?Sized>(
        &self,
        connector: Arc<C>,
    ) -> Result<watch::Receiver<SessionStatus>, CoreError> {
        let mut slot = self.inner.session.lock().await;
        if let Some(ref handle) = *slot {
            if !handle.is_finished() {
                debug!("event session already running");
                return Ok(handle.subscribe());
            }
        }

        let session_config = self.inner.config.session_config()?;
        info!(url = %session_config.url, "starting event session");

        let handle = SessionManager::new(
            session_config,
            connector,
            Arc::clone(&self.inner.registry),
            self.inner.relay.clone(),
        )
        .start();
        let status = handle.subscribe();
        *slot = Some(handle);
        Ok(status)
    }

    /// Stop the event session and wait for it to wind down.
    pub async fn disconnect(&self) {
        let handle = self.inner.session.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown();
            handle.join().await;
        }
        self.inner.registry.set_connected(false);
        debug!("disconnected");
    }

    pub async fn session_status(&self) -> Option<SessionStatus> {
        self.inner
            .session
            .lock()
            .await
            .as_ref()
            .map(SessionHandle::status)
    }

    // ── Command execution ────────────────────────────────────────────

    /// Execute a command against the backend.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        debug!(command = cmd.name(), "executing command");
        let registry = &self.inner.registry;
        let client = &self.inner.client;

        match cmd {
            Command::Scan => {
                let resp = {
                    let _scanning = ScanningGuard::new(registry);
                    client.scan_network().await?
                };
                let outcome = scan_outcome(resp);
                registry.set_devices(outcome.devices.iter().cloned());
                info!(found = outcome.devices.len(), "network scan complete");
                Ok(CommandResult::Scan(outcome))
            }

            Command::ScanRange {
                base_ip,
                start_range,
                end_range,
            } => {
                validate_range(start_range, end_range)?;
                let request = ScanRangeRequest {
                    base_ip,
                    start_range,
                    end_range,
                };
                let resp = {
                    let _scanning = ScanningGuard::new(registry);
                    client.scan_range(&request).await?
                };
                let outcome = scan_outcome(resp);
                for device in &outcome.devices {
                    registry.upsert_device(device.clone());
                }
                info!(found = outcome.devices.len(), "ranged scan complete");
                Ok(CommandResult::Scan(outcome))
            }

            Command::RemoveDevice { id } => {
                client.remove_device(id.as_str()).await?;
                registry.remove_device(&id);
                Ok(CommandResult::Removed(id))
            }

            Command::UpdateNetworkConfig(update) => {
                let mut merged = registry.network_config();
                merged.merge(&update);
                validate_range(merged.start_range, merged.end_range)?;

                client
                    .update_network_config(&NetworkConfigRequest {
                        base_ip: merged.base_ip.clone(),
                        start_range: merged.start_range,
                        end_range: merged.end_range,
                        detect_port: Some(merged.detect_port),
                        stream_port: Some(merged.stream_port),
                    })
                    .await?;

                registry.set_network_config(&update);
                Ok(CommandResult::NetworkConfig(registry.network_config()))
            }
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Fetch the full device list and replace the registry's copy.
    pub async fn refresh_devices(&self) -> Result<Arc<DeviceTable>, CoreError> {
        let records = self.inner.client.list_devices().await?;
        self.inner
            .registry
            .set_devices(records.into_iter().map(Device::from));
        Ok(self.inner.registry.devices_snapshot())
    }

    /// Fetch one device and upsert it into the registry.
    pub async fn device(&self, id: &DeviceId) -> Result<Arc<Device>, CoreError> {
        let record = self
            .inner
            .client
            .get_device(id.as_str())
            .await?
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: id.to_string(),
            })?;

        let device = Device::from(record);
        self.inner.registry.upsert_device(device.clone());
        Ok(Arc::new(device))
    }

    /// Fetch aggregate counters and merge them into the registry.
    pub async fn refresh_status(&self) -> Result<SystemStatus, CoreError> {
        let record = self.inner.client.system_status().await?;
        self.inner
            .registry
            .merge_system_status(&SystemStatusUpdate::from(record));
        Ok(self.inner.registry.system_status())
    }

    // ── State observation ────────────────────────────────────────────

    pub fn devices(&self) -> DeviceStream {
        self.inner.registry.subscribe_devices()
    }

    pub fn frames(&self) -> FrameSubscription {
        self.inner.relay.subscribe()
    }

    pub fn network_config(&self) -> NetworkConfig {
        self.inner.registry.network_config()
    }
}

/// Holds the registry's scanning flag up for its lifetime.
struct ScanningGuard<'a>(&'a Registry);

impl<'a> ScanningGuard<'a> {
    fn new(registry: &'a Registry) -> Self {
        registry.set_scanning(true);
        Self(registry)
    }
}

impl Drop for ScanningGuard<'_> {
    fn drop(&mut self) {
        self.0.set_scanning(false);
    }
}

fn scan_outcome(resp: ScanResponse) -> ScanOutcome {
    ScanOutcome {
        devices: resp.devices.into_iter().map(Device::from).collect(),
        message: resp.message,
        range: resp.range,
    }
}

fn validate_range(start: u32, end: u32) -> Result<(), CoreError> {
    if start > end {
        return Err(CoreError::ValidationFailed {
            message: format!("range start {start} is after end {end}"),
        });
    }
    if end > MAX_HOST {
        return Err(CoreError::ValidationFailed {
            message: format!("range end {end} exceeds {MAX_HOST}"),
        });
    }
    Ok(())
}
