//! Device command handlers.

use std::sync::Arc;

use tabled::Tabled;

use fleetmirror_core::{Command as CoreCommand, Controller, Device, DeviceFilter, DeviceId};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts, Reachability};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Connected")]
    connected: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
    #[tabled(rename = "Last Update")]
    last_update: String,
}

impl DeviceRow {
    pub(crate) fn new(d: &Device, color: bool) -> Self {
        Self {
            id: d.id.to_string(),
            name: d.name.clone().unwrap_or_default(),
            address: address(d),
            status: d.status.clone(),
            connected: output::paint_state(
                if d.connected { "yes" } else { "no" },
                d.connected,
                color,
            ),
            resolution: d
                .resolution()
                .map(|(w, h)| format!("{w}x{h}"))
                .unwrap_or_default(),
            last_update: util::format_time(d.last_update),
        }
    }
}

fn address(d: &Device) -> String {
    match (d.ip, d.port) {
        (Some(ip), Some(port)) => format!("{ip}:{port}"),
        (Some(ip), None) => ip.to_string(),
        _ => String::new(),
    }
}

fn detail(d: &Arc<Device>) -> String {
    [
        format!("ID:          {}", d.id),
        format!("Name:        {}", d.name.as_deref().unwrap_or("-")),
        format!("Address:     {}", util::or_dash(&address(d))),
        format!("Status:      {}", d.status),
        format!("Connected:   {}", d.connected),
        format!(
            "Resolution:  {}",
            d.resolution()
                .map_or_else(|| "-".into(), |(w, h)| format!("{w}x{h}"))
        ),
        format!("Last Update: {}", util::or_dash(&util::format_time(d.last_update))),
    ]
    .join("\n")
}

fn list_filter(reachability: Reachability, status: Option<String>) -> DeviceFilter {
    if let Some(label) = status {
        return DeviceFilter::ByStatus(label);
    }
    match reachability {
        Reachability::All => DeviceFilter::All,
        Reachability::Online => DeviceFilter::Online,
        Reachability::Offline => DeviceFilter::Offline,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        DevicesCommand::List { filter, status } => {
            let table = controller.refresh_devices().await?;
            let devices = table.filtered(&list_filter(filter, status));
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::new(d, color),
                |d| d.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let id = DeviceId::from(device.as_str());
            let found = controller.device(&id).await?;
            let out = output::render_single(&global.output, &found, detail, |d| d.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Remove { device } => {
            let id = DeviceId::from(device.as_str());
            if !util::confirm(&format!("Remove device {id}?"), global.yes)? {
                return Ok(());
            }
            controller.execute(CoreCommand::RemoveDevice { id }).await?;
            output::notice("Device removed", global.quiet);
            Ok(())
        }
    }
}
