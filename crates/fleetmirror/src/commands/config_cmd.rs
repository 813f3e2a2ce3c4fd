//! Config subcommand handlers. None of these talk to the backend.

use dialoguer::Input;
use fleetmirror_config::ConfigError;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    active: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "TLS")]
    tls: &'static str,
}

#[derive(serde::Serialize)]
struct NamedProfile<'a> {
    name: &'a str,
    default: bool,
    #[serde(flatten)]
    profile: &'a Profile,
}

fn tls_label(profile: &Profile) -> &'static str {
    if profile.insecure == Some(true) {
        "insecure"
    } else if profile.ca_cert.is_some() {
        "custom ca"
    } else {
        "system"
    }
}

/// Server URL from `--server`, or asked for interactively.
fn prompt_server(global: &GlobalOpts) -> Result<String, CliError> {
    if let Some(ref server) = global.server {
        return Ok(server.clone());
    }
    let server: String = Input::new()
        .with_prompt("Server API URL")
        .with_initial_text("http://192.168.31.10:8080/api")
        .interact_text()?;
    Ok(server)
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { name, set_default } => {
            let mut cfg = config::load_config_or_default();

            let mut profile = Profile {
                server: prompt_server(global)?,
                ..Profile::default()
            };
            config::apply_overrides(&mut profile, global);

            // Reject unusable URLs before they reach the file.
            fleetmirror_config::profile_to_fleet_config(&profile, &cfg.defaults)?;

            if set_default || cfg.profiles.is_empty() {
                cfg.default_profile = Some(name.clone());
            }
            cfg.profiles.insert(name.clone(), profile);
            config::save_config(&cfg)?;

            output::notice(
                &format!(
                    "Profile '{name}' saved to {}",
                    config::config_path().display()
                ),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            let text = toml::to_string_pretty(&cfg).map_err(ConfigError::from)?;
            let out = output::render_single(
                &global.output,
                &cfg,
                |_| text.trim_end().to_owned(),
                |c: &Config| c.default_profile.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), false);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let default = cfg.default_profile.as_deref();

            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort();
            let profiles: Vec<NamedProfile<'_>> = names
                .into_iter()
                .map(|name| NamedProfile {
                    name,
                    default: default == Some(name.as_str()),
                    profile: &cfg.profiles[name],
                })
                .collect();

            let out = output::render_list(
                &global.output,
                &profiles,
                |p| ProfileRow {
                    active: if p.default { "*" } else { "" },
                    name: p.name.to_owned(),
                    server: p.profile.server.clone(),
                    tls: tls_label(p.profile),
                },
                |p| p.name.to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
