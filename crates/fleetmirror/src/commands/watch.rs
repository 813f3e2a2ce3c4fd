//! Watch command: follow the live event session until Ctrl-C.
//!
//! Prints one line per session transition, device change, and (with
//! `--frames`) incoming frame. Structured output formats emit one
//! serialized event per line instead.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use fleetmirror_core::{
    Controller, Device, DeviceId, DeviceTable, Frame, FrameSubscription, SessionState,
    SessionStatus,
};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Events ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum WatchEvent {
    Session {
        state: String,
        generation: u64,
        retries: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    DeviceAdded {
        device: Arc<Device>,
    },
    DeviceUpdated {
        device: Arc<Device>,
    },
    DeviceRemoved {
        id: DeviceId,
    },
    Frame {
        device_id: DeviceId,
        timestamp: i64,
        mime_type: Option<String>,
        bytes: usize,
    },
}

impl WatchEvent {
    fn session(status: &SessionStatus) -> Self {
        let reason = match status.state {
            SessionState::Closed(ref reason) => Some(reason.to_string()),
            _ => None,
        };
        Self::Session {
            state: status.connection().to_string(),
            generation: status.generation,
            retries: status.retries,
            reason,
        }
    }

    fn frame(frame: &Frame) -> Self {
        Self::Frame {
            device_id: frame.device_id.clone(),
            timestamp: frame.timestamp,
            mime_type: frame.mime_type().map(str::to_owned),
            bytes: frame.image_bytes().map_or(0, |b| b.len()),
        }
    }

    fn to_line(&self, color: bool) -> String {
        match self {
            Self::Session {
                state,
                generation,
                retries,
                reason,
            } => {
                let painted = output::paint_state(state, state == "connected", color);
                let mut line = format!("session {painted}");
                if let Some(reason) = reason {
                    line.push_str(&format!(": {reason}"));
                }
                if *retries > 0 {
                    line.push_str(&format!(" (retry {retries})"));
                }
                format!(
                    "{line} {}",
                    output::paint_dim(&format!("[gen {generation}]"), color)
                )
            }
            Self::DeviceAdded { device } => {
                format!("+ {} {}", device.label(), device_state(device, color))
            }
            Self::DeviceUpdated { device } => {
                let stamp = util::format_time(device.last_update);
                format!(
                    "~ {} {} {}",
                    device.label(),
                    device_state(device, color),
                    output::paint_dim(&stamp, color)
                )
            }
            Self::DeviceRemoved { id } => format!("- device {id}"),
            Self::Frame {
                device_id,
                timestamp,
                mime_type,
                bytes,
            } => format!(
                "frame device={device_id} ts={timestamp} type={} bytes={bytes}",
                mime_type.as_deref().unwrap_or("unknown")
            ),
        }
    }
}

fn device_state(device: &Device, color: bool) -> String {
    output::paint_state(&device.status, device.connected, color)
}

/// Changes from `prev` to `next`, in `next`'s order, removals last.
fn diff_tables(prev: &DeviceTable, next: &DeviceTable) -> Vec<WatchEvent> {
    let mut events: Vec<WatchEvent> = next
        .iter()
        .filter_map(|device| match prev.get(&device.id) {
            None => Some(WatchEvent::DeviceAdded {
                device: Arc::clone(device),
            }),
            Some(old) if old != device => Some(WatchEvent::DeviceUpdated {
                device: Arc::clone(device),
            }),
            Some(_) => None,
        })
        .collect();

    events.extend(
        prev.iter()
            .filter(|device| !next.contains(&device.id))
            .map(|device| WatchEvent::DeviceRemoved {
                id: device.id.clone(),
            }),
    );
    events
}

// ── Rendering ───────────────────────────────────────────────────────

struct Printer<'a> {
    global: &'a GlobalOpts,
    color: bool,
}

impl Printer<'_> {
    fn emit(&self, event: &WatchEvent) -> Result<(), CliError> {
        let line = match self.global.output {
            OutputFormat::Table | OutputFormat::Plain => event.to_line(self.color),
            OutputFormat::Json | OutputFormat::JsonCompact => serde_json::to_string(event)?,
            OutputFormat::Yaml => format!("---\n{}", serde_yaml::to_string(event)?),
        };
        output::print_output(line.trim_end(), self.global.quiet);
        Ok(())
    }
}

// ── Handler ─────────────────────────────────────────────────────────

async fn next_frame(frames: Option<&mut FrameSubscription>) -> Option<Arc<Frame>> {
    match frames {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

pub async fn handle(
    controller: &Controller,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let printer = Printer {
        global,
        color: output::should_color(&global.color),
    };
    let deadline = args
        .duration
        .map(|secs| Instant::now() + Duration::from_secs(secs));

    // Subscribe before connecting so nothing between open and the first
    // device list is missed.
    let mut devices = controller.devices();
    let mut frames = args.frames.then(|| controller.frames());
    let mut status = controller.connect_events().await?;
    let mut previous = Arc::clone(devices.current());

    printer.emit(&WatchEvent::session(&status.borrow_and_update()))?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                break;
            }
            () = until(deadline) => break,
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = status.borrow_and_update().clone();
                printer.emit(&WatchEvent::session(&snapshot))?;
            }
            Some(table) = devices.changed() => {
                for event in diff_tables(&previous, &table) {
                    printer.emit(&event)?;
                }
                previous = table;
            }
            Some(frame) = next_frame(frames.as_mut()) => {
                printer.emit(&WatchEvent::frame(&frame))?;
            }
        }
    }

    controller.disconnect().await;
    Ok(())
}
