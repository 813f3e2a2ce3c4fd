// ── Registry store ──

mod devices;
mod registry;

pub use devices::DeviceTable;
pub use registry::Registry;
