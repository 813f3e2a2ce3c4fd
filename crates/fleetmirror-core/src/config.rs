// ── Runtime connection configuration ──
//
// Describes *how* to reach a fleet backend. Never touches disk: the CLI
// builds a `FleetConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use fleetmirror_api::transport::{TlsMode, TransportConfig};

use crate::error::CoreError;
use crate::relay::DEFAULT_FRAME_BUFFER;
use crate::session::{DEFAULT_RECONNECT_DELAY, SessionConfig};

/// Path of the event stream below the API root.
const EVENT_PATH: &str = "ws/screen";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed backends on a LAN).
    DangerAcceptInvalid,
}

/// Configuration for one fleet backend.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// API root, e.g. `http://192.168.31.10:8080/api`.
    pub server: Url,
    /// Event stream endpoint. Derived from `server` when unset.
    pub event_url: Option<Url>,
    pub tls: TlsVerification,
    /// REST request timeout.
    pub timeout: Duration,
    /// Pause between a lost event stream and the next attempt.
    pub reconnect_delay: Duration,
    /// Frames buffered per subscriber before the oldest are dropped.
    pub frame_buffer: usize,
}

impl FleetConfig {
    pub fn new(server: Url) -> Self {
        Self {
            server,
            event_url: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(10),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            frame_buffer: DEFAULT_FRAME_BUFFER,
        }
    }

    /// Event stream URL: the override if set, else `<server>/ws/screen`
    /// with `http` mapped to `ws` and `https` to `wss`.
    pub fn event_url(&self) -> Result<Url, CoreError> {
        if let Some(ref url) = self.event_url {
            return Ok(url.clone());
        }

        let scheme = match self.server.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(CoreError::Config {
                    message: format!("unsupported server scheme '{other}'"),
                });
            }
        };

        let invalid = || CoreError::Config {
            message: format!("cannot derive event stream URL from {}", self.server),
        };

        let mut url = self.server.clone();
        url.set_fragment(None);
        url.set_scheme(scheme).map_err(|()| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(EVENT_PATH.split('/'));
        Ok(url)
    }

    pub fn session_config(&self) -> Result<SessionConfig, CoreError> {
        Ok(SessionConfig {
            url: self.event_url()?,
            reconnect_delay: self.reconnect_delay,
        })
    }

    pub fn transport_config(&self) -> TransportConfig {
        let tls = match self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(ref path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }
}
