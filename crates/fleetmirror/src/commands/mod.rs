//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod network;
pub mod scan;
pub mod status;
pub mod util;
pub mod watch;

use fleetmirror_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Watch(args) => watch::handle(controller, args, global).await,
        Command::Devices(args) => devices::handle(controller, args, global).await,
        Command::Scan(args) => scan::handle(controller, args, global).await,
        Command::Status => status::handle(controller, global).await,
        Command::Network(args) => network::handle(controller, args, global).await,
        // Handled before a controller exists
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
