//! CLI configuration: thin wrapper around `fleetmirror_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--server, --insecure, --timeout, ...).

use fleetmirror_core::FleetConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use fleetmirror_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Copy flag overrides onto a profile. Flags take priority.
pub fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if let Some(ref event_url) = global.event_url {
        profile.event_url = Some(event_url.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    if let Some(delay) = global.reconnect_delay {
        profile.reconnect_delay = Some(delay);
    }
}

/// Build a `FleetConfig` from the config file, active profile, and flags.
///
/// A missing profile is fine as long as `--server` names the backend;
/// an explicitly requested profile must exist.
pub fn build_fleet_config(global: &GlobalOpts) -> Result<FleetConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(&cfg),
            });
        }
        None if global.server.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    apply_overrides(&mut profile, global);
    tracing::debug!(profile = %profile_name, server = %profile.server, "resolved profile");
    Ok(fleetmirror_config::profile_to_fleet_config(
        &profile,
        &cfg.defaults,
    )?)
}

/// Comma-separated, sorted profile names for help text.
pub fn available_profiles(cfg: &Config) -> String {
    join_profile_names(&cfg.profile_names())
}

pub(crate) fn join_profile_names(names: &[String]) -> String {
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}
