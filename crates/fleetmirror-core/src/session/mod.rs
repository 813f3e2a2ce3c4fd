// ── Event session ──
//
// Owns the lifecycle of one logical connection to the backend's event
// stream: connect, route decoded events, notice closure, reconnect after a
// fixed delay. Retries are unbounded and the delay never grows.
//
//   Idle ──start──▶ Connecting ──open──▶ Open
//                       ▲                 │ close / error
//                       │                 ▼
//                       └──── delay ──── Closed(reason)

mod driver;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use fleetmirror_api::Connector;

use crate::relay::FrameRelay;
use crate::store::Registry;

use self::driver::Driver;

/// Default pause between a closed transport and the next attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

// ── Configuration ────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Event stream endpoint, e.g. `ws://host:8080/api/ws/screen`.
    pub url: Url,
    pub reconnect_delay: Duration,
}

impl SessionConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

// ── State ────────────────────────────────────────────────────────────

/// Fine-grained lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Open,
    Closed(CloseReason),
}

/// Why the last transport went away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// The connection attempt itself failed.
    ConnectFailed(String),
    /// Read error after the transport was open.
    Transport(String),
    /// The server sent a close frame.
    Remote { code: Option<u16>, reason: String },
    /// The stream ended without a close frame.
    Ended,
    /// Local shutdown; no reconnect follows.
    Shutdown,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectFailed(e) => write!(f, "connect failed: {e}"),
            Self::Transport(e) => write!(f, "transport error: {e}"),
            Self::Remote { code: Some(code), reason } if !reason.is_empty() => {
                write!(f, "closed by server ({code}): {reason}")
            }
            Self::Remote { code: Some(code), .. } => write!(f, "closed by server ({code})"),
            Self::Remote { .. } => f.write_str("closed by server"),
            Self::Ended => f.write_str("stream ended"),
            Self::Shutdown => f.write_str("shut down"),
        }
    }
}

/// Coarse connection state, as a status bar would show it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Snapshot published by the session driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: SessionState,
    /// Incremented on every connection attempt.
    pub generation: u64,
    /// Consecutive closes since the last successful open.
    pub retries: u32,
}

impl SessionStatus {
    pub fn connection(&self) -> ConnectionState {
        match self.state {
            SessionState::Open => ConnectionState::Connected,
            SessionState::Connecting => ConnectionState::Connecting,
            SessionState::Idle | SessionState::Closed(_) => ConnectionState::Disconnected,
        }
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            generation: 0,
            retries: 0,
        }
    }
}

// ── SessionManager ───────────────────────────────────────────────────

/// Builds and starts the session driver.
pub struct SessionManager<C: Connector + ?Sized> {
    config: SessionConfig,
    connector: Arc<C>,
    registry: Arc<Registry>,
    relay: FrameRelay,
}

impl<C: Connector + ?Sized> SessionManager<C> {
    pub fn new(
        config: SessionConfig,
        connector: Arc<C>,
        registry: Arc<Registry>,
        relay: FrameRelay,
    ) -> Self {
        Self {
            config,
            connector,
            registry,
            relay,
        }
    }

    /// Spawn the driver and make the first connection attempt.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> SessionHandle {
        let cancel = CancellationToken::new();
        let (status_tx, status_rx) = watch::channel(SessionStatus::default());

        let driver = Driver::new(
            self.config,
            self.connector,
            self.registry,
            self.relay,
            status_tx,
            cancel.clone(),
        );
        let task = tokio::spawn(driver.run());

        SessionHandle {
            status: status_rx,
            cancel,
            task,
        }
    }
}

// ── SessionHandle ────────────────────────────────────────────────────

/// Handle to a running session.
///
/// Dropping the handle leaves the session running; call
/// [`shutdown`](Self::shutdown) to stop it.
pub struct SessionHandle {
    status: watch::Receiver<SessionStatus>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Stop reconnecting and close the live transport, if any.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the driver task to exit.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "session driver task failed");
        }
    }
}
