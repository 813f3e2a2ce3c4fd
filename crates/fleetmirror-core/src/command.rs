// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller routes each variant to the REST command transport and keeps
// the registry in step with the outcome.

use crate::model::{Device, DeviceId, NetworkConfig, NetworkConfigUpdate};

/// All write operations against the fleet backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Scan the whole configured range. Blocks until the backend finishes.
    Scan,
    /// Scan `{base_ip}.{start_range..=end_range}` only.
    ScanRange {
        base_ip: String,
        start_range: u32,
        end_range: u32,
    },
    RemoveDevice {
        id: DeviceId,
    },
    /// Merge into the current scan configuration and push the result.
    UpdateNetworkConfig(NetworkConfigUpdate),
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::ScanRange { .. } => "scan_range",
            Self::RemoveDevice { .. } => "remove_device",
            Self::UpdateNetworkConfig(_) => "update_network_config",
        }
    }
}

/// Result of a successfully executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Scan(ScanOutcome),
    Removed(DeviceId),
    NetworkConfig(NetworkConfig),
}

/// What a scan found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub devices: Vec<Device>,
    pub message: Option<String>,
    /// Scanned range label, e.g. `192.168.31.0-20`. Only set for ranged scans.
    pub range: Option<String>,
}
