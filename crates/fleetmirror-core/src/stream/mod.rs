// ── Reactive device streams ──
//
// Subscription types for consuming registry changes.

mod filter;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Device;
use crate::store::DeviceTable;

pub use filter::DeviceFilter;

/// A subscription to the device table.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed`](Self::changed) or by converting into a `Stream`.
pub struct DeviceStream {
    current: Arc<DeviceTable>,
    receiver: watch::Receiver<Arc<DeviceTable>>,
}

impl DeviceStream {
    pub(crate) fn new(mut receiver: watch::Receiver<Arc<DeviceTable>>) -> Self {
        let current = receiver.borrow_and_update().clone();
        Self { current, receiver }
    }

    /// The snapshot seen by the last `changed()` call (or at creation).
    pub fn current(&self) -> &Arc<DeviceTable> {
        &self.current
    }

    /// The latest snapshot, which may be newer than [`current`](Self::current).
    pub fn latest(&self) -> Arc<DeviceTable> {
        self.receiver.borrow().clone()
    }

    /// Whether the table changed since the last observed snapshot.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the registry is dropped.
    pub async fn changed(&mut self) -> Option<Arc<DeviceTable>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Wait for the next change and return only the devices matching `filter`.
    pub async fn changed_filtered(&mut self, filter: &DeviceFilter) -> Option<Vec<Arc<Device>>> {
        self.changed().await.map(|table| table.filtered(filter))
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    ///
    /// The stream yields the current snapshot first, then one item per change.
    pub fn into_stream(self) -> DeviceWatchStream {
        DeviceWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
pub struct DeviceWatchStream {
    inner: WatchStream<Arc<DeviceTable>>,
}

impl Stream for DeviceWatchStream {
    type Item = Arc<DeviceTable>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures_util::StreamExt;

    use super::*;
    use crate::model::DeviceId;
    use crate::store::Registry;

    #[tokio::test]
    async fn changed_yields_new_snapshot() {
        let registry = Registry::new();
        let mut stream = registry.subscribe_devices();
        assert!(stream.current().is_empty());

        registry.upsert_device(Device::new("1", "online", true));

        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.len(), 1);
        assert!(Arc::ptr_eq(stream.current(), &snap));
    }

    #[tokio::test]
    async fn filtered_change_applies_predicate() {
        let registry = Registry::new();
        let mut stream = registry.subscribe_devices();

        registry.set_devices([
            Device::new("1", "online", true),
            Device::new("2", "offline", false),
        ]);

        let offline = stream
            .changed_filtered(&DeviceFilter::Offline)
            .await
            .unwrap();
        assert_eq!(offline.len(), 1);
        assert_eq!(offline[0].id, DeviceId::from("2"));
    }

    #[tokio::test]
    async fn stream_starts_with_current_snapshot() {
        let registry = Registry::new();
        registry.upsert_device(Device::new("1", "online", true));

        let mut stream = registry.subscribe_devices().into_stream();
        let first = stream.next().await.unwrap();
        assert_eq!(first.len(), 1);

        registry.remove_device(&DeviceId::from("1"));
        let second = stream.next().await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn changed_returns_none_when_registry_dropped() {
        let registry = Registry::new();
        let mut stream = registry.subscribe_devices();
        drop(registry);
        assert!(stream.changed().await.is_none());
    }
}
