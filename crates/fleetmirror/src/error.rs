//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use fleetmirror_config::ConfigError;
use fleetmirror_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(fleetmirror::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             URL: {url}\n\
             Try: fleetmirror status --server http://<host>:8080/api"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(fleetmirror::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Access ───────────────────────────────────────────────────────

    #[error("Unauthorized: {message}")]
    #[diagnostic(code(fleetmirror::unauthorized))]
    AuthFailed { message: String },

    #[error("Access denied: {message}")]
    #[diagnostic(code(fleetmirror::forbidden))]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(fleetmirror::not_found),
        help("Run: fleetmirror {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}): {message}")]
    #[diagnostic(code(fleetmirror::api_error))]
    ApiError {
        code: String,
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fleetmirror::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fleetmirror::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: fleetmirror config init --name {name} --server <url>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(fleetmirror::no_config),
        help(
            "Pass --server <url>, or create a profile with: fleetmirror config init --server <url>\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(fleetmirror::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Prompt failed: {0}")]
    #[diagnostic(
        code(fleetmirror::prompt),
        help("Use --yes (-y) and explicit flags in non-interactive contexts.")
    )]
    Prompt(#[from] dialoguer::Error),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    #[diagnostic(code(fleetmirror::json))]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    #[diagnostic(code(fleetmirror::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. }
            | Self::ApiError {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::InvalidParameters { message } => CliError::Validation {
                field: "request".into(),
                reason: message,
            },

            CoreError::Unauthorized { message } => CliError::AuthFailed { message },

            CoreError::Forbidden { message } => CliError::PermissionDenied { message },

            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },

            CoreError::NotFound { message } => CliError::ApiError {
                code: "not_found".into(),
                message,
                status: Some(404),
            },

            CoreError::Server { message, status } => CliError::ApiError {
                code: "server_error".into(),
                message,
                status,
            },

            CoreError::Rejected { message } => CliError::ApiError {
                code: "rejected".into(),
                message,
                status: None,
            },

            CoreError::InvalidResponse { message } => CliError::ApiError {
                code: "invalid_response".into(),
                message,
                status: None,
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name, available } => CliError::ProfileNotFound {
                name,
                available: crate::config::join_profile_names(&available),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (CoreError::Timeout, exit_code::TIMEOUT),
            (
                CoreError::DeviceNotFound {
                    identifier: "7".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::NotFound {
                    message: "gone".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::Unauthorized {
                    message: "who".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::ValidationFailed {
                    message: "bad range".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Server {
                    message: "boom".into(),
                    status: Some(500),
                },
                exit_code::GENERAL,
            ),
        ];

        for (core, code) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn unknown_profile_becomes_profile_not_found() {
        let err = CliError::from(ConfigError::UnknownProfile {
            name: "lab".into(),
            available: vec!["home".into(), "office".into()],
        });
        assert!(matches!(
            err,
            CliError::ProfileNotFound { ref name, ref available }
                if name == "lab" && available == "home, office"
        ));

        let err = CliError::from(ConfigError::UnknownProfile {
            name: "lab".into(),
            available: Vec::new(),
        });
        assert!(matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "(none)"));
    }
}
