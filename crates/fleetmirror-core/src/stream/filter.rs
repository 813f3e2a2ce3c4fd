// ── Filter predicates for device streams ──

use crate::model::Device;

/// Filter predicate for device snapshots.
pub enum DeviceFilter {
    All,
    Online,
    Offline,
    /// Exact match on the backend's status label.
    ByStatus(String),
    Custom(Box<dyn Fn(&Device) -> bool + Send + Sync>),
}

impl DeviceFilter {
    pub fn matches(&self, device: &Device) -> bool {
        match self {
            Self::All => true,
            Self::Online => device.is_online(),
            Self::Offline => !device.is_online(),
            Self::ByStatus(status) => device.status == *status,
            Self::Custom(f) => f(device),
        }
    }
}

impl std::fmt::Debug for DeviceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Online => f.write_str("Online"),
            Self::Offline => f.write_str("Offline"),
            Self::ByStatus(s) => f.debug_tuple("ByStatus").field(s).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
