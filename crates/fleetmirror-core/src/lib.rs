// fleetmirror-core: reactive device registry, event session and command layer
// between fleetmirror-api and consumers (CLI, UI bridges).

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod relay;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult, ScanOutcome};
pub use config::{FleetConfig, TlsVerification};
pub use controller::Controller;
pub use error::CoreError;
pub use relay::{FrameRelay, FrameSubscription};
pub use session::{
    CloseReason, ConnectionState, SessionConfig, SessionHandle, SessionManager, SessionState,
    SessionStatus,
};
pub use store::{DeviceTable, Registry};
pub use stream::{DeviceFilter, DeviceStream};

pub use model::{
    Device, DeviceId, Frame, NetworkConfig, NetworkConfigUpdate, SystemStatus, SystemStatusUpdate,
};
