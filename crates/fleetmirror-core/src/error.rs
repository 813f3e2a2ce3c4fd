// ── Core error types ──
//
// User-facing errors from fleetmirror-core. Consumers see the backend's
// failure classification, not raw HTTP or JSON errors; the
// `From<fleetmirror_api::Error>` impl does the translation.

use thiserror::Error;

use fleetmirror_api::FailureKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Request errors ───────────────────────────────────────────────
    #[error("Invalid request parameters: {message}")]
    InvalidParameters { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Access denied: {message}")]
    Forbidden { message: String },

    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Resource not found: {message}")]
    NotFound { message: String },

    #[error("Server error: {message}")]
    Server { message: String, status: Option<u16> },

    #[error("Operation rejected by server: {message}")]
    Rejected { message: String },

    #[error("Unexpected response: {message}")]
    InvalidResponse { message: String },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Backend failure classification, when the error came from a request.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout => Some(FailureKind::Network),
            Self::InvalidParameters { .. } => Some(FailureKind::Parameter),
            Self::Unauthorized { .. } => Some(FailureKind::Unauthorized),
            Self::Forbidden { .. } => Some(FailureKind::Forbidden),
            Self::DeviceNotFound { .. } | Self::NotFound { .. } => Some(FailureKind::NotFound),
            Self::Server { .. } | Self::Rejected { .. } | Self::InvalidResponse { .. } => {
                Some(FailureKind::Server)
            }
            Self::ValidationFailed { .. } | Self::Config { .. } => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fleetmirror_api::Error> for CoreError {
    fn from(err: fleetmirror_api::Error) -> Self {
        use fleetmirror_api::Error as Api;

        match err {
            Api::Api {
                kind,
                status,
                message,
            } => match kind {
                FailureKind::Parameter => CoreError::InvalidParameters { message },
                FailureKind::Unauthorized => CoreError::Unauthorized { message },
                FailureKind::Forbidden => CoreError::Forbidden { message },
                FailureKind::NotFound => CoreError::NotFound { message },
                FailureKind::Server | FailureKind::Network => CoreError::Server {
                    message,
                    status: Some(status),
                },
            },
            Api::Rejected { message } => CoreError::Rejected { message },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() || e.status().is_none() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Server {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::InvalidDeviceId(id) => CoreError::ValidationFailed {
                message: format!("invalid device id '{id}'"),
            },
            Api::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            Api::Deserialization { message, body: _ } => CoreError::InvalidResponse { message },
            Api::WebSocketConnect(reason) | Api::WebSocket(reason) => {
                CoreError::ConnectionFailed {
                    url: String::new(),
                    reason,
                }
            }
        }
    }
}
