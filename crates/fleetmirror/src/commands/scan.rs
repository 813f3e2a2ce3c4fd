//! Scan command handler.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use fleetmirror_core::{Command as CoreCommand, CommandResult, Controller, NetworkConfig};

use crate::cli::{GlobalOpts, ScanArgs};
use crate::error::CliError;
use crate::output;

use super::devices::DeviceRow;

/// Turn the flags into a core command. Missing range parts fall back to
/// the default scan configuration.
fn scan_command(args: ScanArgs) -> CoreCommand {
    if !args.is_ranged() {
        return CoreCommand::Scan;
    }
    let defaults = NetworkConfig::default();
    CoreCommand::ScanRange {
        base_ip: args.base_ip.unwrap_or(defaults.base_ip),
        start_range: args.start.unwrap_or(defaults.start_range),
        end_range: args.end.unwrap_or(defaults.end_range),
    }
}

fn spinner(message: String, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner().with_message(message);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

pub async fn handle(
    controller: &Controller,
    args: ScanArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let command = scan_command(args);
    let label = match command {
        CoreCommand::ScanRange {
            ref base_ip,
            start_range,
            end_range,
        } => format!("Scanning {base_ip}.{start_range}-{end_range}"),
        _ => "Scanning network".to_owned(),
    };

    let bar = spinner(label, global.quiet);
    let result = controller.execute(command).await;
    bar.finish_and_clear();

    let CommandResult::Scan(outcome) = result? else {
        return Err(CliError::ApiError {
            code: "unexpected_result".into(),
            message: "scan returned a non-scan result".into(),
            status: None,
        });
    };

    let summary = match (&outcome.range, &outcome.message) {
        (Some(range), _) => format!("Found {} device(s) in {range}", outcome.devices.len()),
        (None, Some(message)) => format!("{message} ({} device(s))", outcome.devices.len()),
        (None, None) => format!("Found {} device(s)", outcome.devices.len()),
    };
    output::notice(&summary, global.quiet);

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &outcome.devices,
        |d| DeviceRow::new(d, color),
        |d| d.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_range_flags_scan_everything() {
        let args = ScanArgs {
            base_ip: None,
            start: None,
            end: None,
        };
        assert_eq!(scan_command(args), CoreCommand::Scan);
    }

    #[test]
    fn partial_range_fills_from_defaults() {
        let args = ScanArgs {
            base_ip: None,
            start: Some(10),
            end: None,
        };
        assert_eq!(
            scan_command(args),
            CoreCommand::ScanRange {
                base_ip: "192.168.31".into(),
                start_range: 10,
                end_range: 255,
            }
        );
    }
}
