use std::fmt;

use thiserror::Error;

/// Top-level error type for the `fleetmirror-api` crate.
///
/// Covers both API surfaces: the REST command transport and the
/// WebSocket event transport. `fleetmirror-core` maps these into
/// user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Command transport ───────────────────────────────────────────
    /// Non-success HTTP status, classified by [`FailureKind`].
    #[error("{kind} (HTTP {status}): {message}")]
    Api {
        kind: FailureKind,
        status: u16,
        message: String,
    },

    /// The server answered 200 but reported `success: false`.
    #[error("Request rejected by server: {message}")]
    Rejected { message: String },

    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Device id that cannot be addressed as a single path segment.
    #[error("Invalid device id: '{0}'")]
    InvalidDeviceId(String),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Event transport ─────────────────────────────────────────────
    /// WebSocket handshake failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket failed after the handshake (reset, protocol violation, ...).
    #[error("WebSocket transport error: {0}")]
    WebSocket(String),
}

impl Error {
    /// Classify the failure the way the control panel reports it to users.
    ///
    /// Returns `None` for local errors (bad URL, TLS setup) that never
    /// reached the server.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Api { kind, .. } => Some(*kind),
            Self::Transport(e) => Some(
                e.status()
                    .map_or(FailureKind::Network, |s| FailureKind::from_status(s.as_u16())),
            ),
            Self::WebSocketConnect(_) | Self::WebSocket(_) => Some(FailureKind::Network),
            Self::Rejected { .. } | Self::Deserialization { .. } => Some(FailureKind::Server),
            Self::InvalidUrl(_) | Self::InvalidDeviceId(_) | Self::Tls(_) => None,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::WebSocketConnect(_) | Self::WebSocket(_) => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        self.failure_kind() == Some(FailureKind::NotFound)
    }
}

/// Failure classes of the command transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// 400 -- missing or invalid request parameters.
    Parameter,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 5xx and any other unexpected status.
    Server,
    /// No response at all.
    Network,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::Parameter,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            _ => Self::Server,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Parameter => "Invalid request parameters",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Access forbidden",
            Self::NotFound => "Resource not found",
            Self::Server => "Server error",
            Self::Network => "Network connection failed",
        };
        f.write_str(text)
    }
}
