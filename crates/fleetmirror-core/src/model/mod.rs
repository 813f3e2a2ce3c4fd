// ── Domain model ──
//
// Canonical types consumers (CLI, UI bridges) depend on. Wire records from
// `fleetmirror-api` are converted into these in `crate::convert`.

pub mod device;
pub mod frame;
pub mod status;

pub use device::{Device, DeviceId};
pub use frame::Frame;
pub use status::{NetworkConfig, NetworkConfigUpdate, SystemStatus, SystemStatusUpdate};
