// ── Ordered device table ──
//
// Immutable-by-convention snapshot held behind an `Arc` in the registry.
// Writers clone-on-write via `Arc::make_mut`, so a reader holding an older
// snapshot never sees it change underneath it.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::{Device, DeviceId};
use crate::stream::DeviceFilter;

/// Devices keyed by id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceTable {
    entries: IndexMap<DeviceId, Arc<Device>>,
}

impl DeviceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a list. A repeated id keeps the position of its
    /// first occurrence and the fields of its last.
    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let mut entries = IndexMap::new();
        for device in devices {
            entries.insert(device.id.clone(), Arc::new(device));
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &DeviceId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &DeviceId) -> Option<&Arc<Device>> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Device>> {
        self.entries.values()
    }

    pub fn online_count(&self) -> usize {
        self.iter().filter(|d| d.is_online()).count()
    }

    /// Devices matching `filter`, in table order.
    pub fn filtered(&self, filter: &DeviceFilter) -> Vec<Arc<Device>> {
        self.iter().filter(|d| filter.matches(d)).cloned().collect()
    }

    /// Insert at the end, or overwrite in place. Returns `false` if the
    /// stored device was already identical.
    pub(crate) fn upsert(&mut self, device: Device) -> bool {
        if self.entries.get(&device.id).is_some_and(|d| **d == device) {
            return false;
        }
        self.entries.insert(device.id.clone(), Arc::new(device));
        true
    }

    /// Remove preserving the order of the remaining entries.
    pub(crate) fn remove(&mut self, id: &DeviceId) -> bool {
        self.entries.shift_remove(id).is_some()
    }

    pub(crate) fn get_mut(&mut self, id: &DeviceId) -> Option<&mut Device> {
        self.entries.get_mut(id).map(Arc::make_mut)
    }
}

impl<'a> IntoIterator for &'a DeviceTable {
    type Item = &'a Arc<Device>;
    type IntoIter = indexmap::map::Values<'a, DeviceId, Arc<Device>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(table: &DeviceTable) -> Vec<&str> {
        table.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn from_devices_collapses_duplicates_at_first_position() {
        let table = DeviceTable::from_devices([
            Device::new("a", "online", true),
            Device::new("b", "online", true),
            Device::new("a", "offline", false),
        ]);

        assert_eq!(ids(&table), ["a", "b"]);
        let a = table.get(&DeviceId::from("a"));
        assert_eq!(a.map(|d| d.status.as_str()), Some("offline"));
    }

    #[test]
    fn remove_keeps_order() {
        let mut table = DeviceTable::from_devices([
            Device::new("1", "online", true),
            Device::new("2", "online", true),
            Device::new("3", "online", true),
        ]);

        assert!(table.remove(&DeviceId::from("2")));
        assert!(!table.remove(&DeviceId::from("2")));
        assert_eq!(ids(&table), ["1", "3"]);
    }

    #[test]
    fn upsert_reports_identical_writes() {
        let mut table = DeviceTable::new();
        assert!(table.upsert(Device::new("1", "online", true)));
        assert!(!table.upsert(Device::new("1", "online", true)));
        assert!(table.upsert(Device::new("1", "offline", false)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.online_count(), 0);
    }
}
