// ── Device registry ──
//
// Single source of truth for device state, aggregate counters, scan
// configuration and connectivity. Every value lives in a `watch` channel:
// a mutation is one `send_*` call, so readers always see either the old or
// the new value in full. Mutations that change nothing do not notify.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::trace;

use super::devices::DeviceTable;
use crate::model::{
    Device, DeviceId, NetworkConfig, NetworkConfigUpdate, SystemStatus, SystemStatusUpdate,
};
use crate::stream::{DeviceFilter, DeviceStream};

/// Shared, reactive device registry.
///
/// Constructed explicitly and shared behind an `Arc`; the session driver
/// and the controller are its only writers.
pub struct Registry {
    devices: watch::Sender<Arc<DeviceTable>>,
    system_status: watch::Sender<SystemStatus>,
    network_config: watch::Sender<NetworkConfig>,
    connected: watch::Sender<bool>,
    scanning: watch::Sender<bool>,
    last_event: watch::Sender<Option<DateTime<Utc>>>,
}

impl Registry {
    pub fn new() -> Self {
        let (devices, _) = watch::channel(Arc::new(DeviceTable::new()));
        let (system_status, _) = watch::channel(SystemStatus::default());
        let (network_config, _) = watch::channel(NetworkConfig::default());
        let (connected, _) = watch::channel(false);
        let (scanning, _) = watch::channel(false);
        let (last_event, _) = watch::channel(None);

        Self {
            devices,
            system_status,
            network_config,
            connected,
            scanning,
            last_event,
        }
    }

    // ── Device mutations ─────────────────────────────────────────────

    /// Replace the whole device list.
    pub fn set_devices(&self, devices: impl IntoIterator<Item = Device>) {
        let table = DeviceTable::from_devices(devices);
        trace!(count = table.len(), "replacing device list");
        self.devices.send_replace(Arc::new(table));
    }

    /// Insert `device`, or overwrite the entry with the same id in place.
    pub fn upsert_device(&self, device: Device) {
        self.devices
            .send_if_modified(|table| Arc::make_mut(table).upsert(device));
    }

    /// Drop a device. Unknown ids are ignored.
    pub fn remove_device(&self, id: &DeviceId) {
        self.devices.send_if_modified(|table| {
            if !table.contains(id) {
                return false;
            }
            Arc::make_mut(table).remove(id)
        });
    }

    /// Apply a status change to a known device, stamping `last_update`
    /// with the receipt time. Unknown ids are ignored.
    pub fn update_device_status(&self, id: &DeviceId, status: String, connected: bool) {
        self.update_device_status_at(id, status, connected, Utc::now());
    }

    pub(crate) fn update_device_status_at(
        &self,
        id: &DeviceId,
        status: String,
        connected: bool,
        now: DateTime<Utc>,
    ) {
        let applied = self.devices.send_if_modified(|table| {
            if !table.contains(id) {
                return false;
            }
            match Arc::make_mut(table).get_mut(id) {
                Some(device) => {
                    device.apply_status(status, connected, now);
                    true
                }
                None => false,
            }
        });
        if !applied {
            trace!(device_id = %id, "status update for unknown device ignored");
        }
    }

    // ── Aggregate mutations ──────────────────────────────────────────

    pub fn merge_system_status(&self, update: &SystemStatusUpdate) {
        self.system_status
            .send_if_modified(|status| status.merge(update));
    }

    pub fn set_network_config(&self, update: &NetworkConfigUpdate) {
        self.network_config
            .send_if_modified(|config| config.merge(update));
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.send_if_modified(|current| {
            let changed = *current != connected;
            *current = connected;
            changed
        });
    }

    pub fn set_scanning(&self, scanning: bool) {
        self.scanning.send_if_modified(|current| {
            let changed = *current != scanning;
            *current = scanning;
            changed
        });
    }

    pub(crate) fn mark_event(&self) {
        self.last_event.send_replace(Some(Utc::now()));
    }

    // ── Read views ───────────────────────────────────────────────────

    pub fn devices_snapshot(&self) -> Arc<DeviceTable> {
        self.devices.borrow().clone()
    }

    pub fn device(&self, id: &DeviceId) -> Option<Arc<Device>> {
        self.devices.borrow().get(id).cloned()
    }

    pub fn online_devices(&self) -> Vec<Arc<Device>> {
        self.devices.borrow().filtered(&DeviceFilter::Online)
    }

    pub fn device_count(&self) -> usize {
        self.devices.borrow().len()
    }

    pub fn online_device_count(&self) -> usize {
        self.devices.borrow().online_count()
    }

    pub fn system_status(&self) -> SystemStatus {
        *self.system_status.borrow()
    }

    pub fn network_config(&self) -> NetworkConfig {
        self.network_config.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    pub fn is_scanning(&self) -> bool {
        *self.scanning.borrow()
    }

    /// Receipt time of the most recent decoded event.
    pub fn last_event(&self) -> Option<DateTime<Utc>> {
        *self.last_event.borrow()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_devices(&self) -> DeviceStream {
        DeviceStream::new(self.devices.subscribe())
    }

    pub fn watch_connected(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    pub fn watch_scanning(&self) -> watch::Receiver<bool> {
        self.scanning.subscribe()
    }

    pub fn watch_system_status(&self) -> watch::Receiver<SystemStatus> {
        self.system_status.subscribe()
    }

    pub fn watch_network_config(&self) -> watch::Receiver<NetworkConfig> {
        self.network_config.subscribe()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
