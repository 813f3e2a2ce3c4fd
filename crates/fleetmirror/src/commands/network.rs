//! Network configuration command handlers.

use fleetmirror_core::{
    Command as CoreCommand, CommandResult, Controller, NetworkConfig, NetworkConfigUpdate,
};

use crate::cli::{GlobalOpts, NetworkArgs, NetworkCommand};
use crate::error::CliError;
use crate::output;

fn detail(c: &NetworkConfig) -> String {
    [
        format!("Range:       {}", c.range_label()),
        format!("Detect Port: {}", c.detect_port),
        format!("Stream Port: {}", c.stream_port),
    ]
    .join("\n")
}

pub async fn handle(
    controller: &Controller,
    args: NetworkArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NetworkCommand::Set {
            base_ip,
            start,
            end,
            detect_port,
            stream_port,
        } => {
            let update = NetworkConfigUpdate {
                base_ip,
                start_range: start,
                end_range: end,
                detect_port,
                stream_port,
            };
            if update.is_empty() {
                return Err(CliError::Validation {
                    field: "network".into(),
                    reason: "nothing to update; pass at least one of --base-ip, --start, \
                             --end, --detect-port, --stream-port"
                        .into(),
                });
            }

            let CommandResult::NetworkConfig(config) = controller
                .execute(CoreCommand::UpdateNetworkConfig(update))
                .await?
            else {
                return Err(CliError::ApiError {
                    code: "unexpected_result".into(),
                    message: "network update returned a non-config result".into(),
                    status: None,
                });
            };

            output::notice("Network configuration updated", global.quiet);
            let out =
                output::render_single(&global.output, &config, detail, NetworkConfig::range_label)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
