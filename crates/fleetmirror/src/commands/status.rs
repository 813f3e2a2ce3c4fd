//! Status command handler.

use fleetmirror_core::{Controller, SystemStatus};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

fn detail(s: &SystemStatus) -> String {
    [
        format!("Devices:     {}", s.device_count),
        format!("Connections: {}", s.active_connections),
        format!("Sessions:    {}", s.active_sessions),
    ]
    .join("\n")
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let status = controller.refresh_status().await?;
    let out = output::render_single(&global.output, &status, detail, |s| {
        format!(
            "{} {} {}",
            s.device_count, s.active_connections, s.active_sessions
        )
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
