//! Clap derive structures for the `fleetmirror` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fleetmirror -- watch and manage a fleet of mirrored mobile screens
#[derive(Debug, Parser)]
#[command(
    name = "fleetmirror",
    version,
    about = "Watch and manage mirrored mobile devices from the command line",
    long_about = "A CLI for a screen-mirroring backend.\n\n\
        Commands go over the backend's REST API; `watch` follows the live\n\
        event stream and reconnects on its own when the link drops.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "FLEETMIRROR_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL, e.g. http://192.168.31.10:8080/api (overrides profile)
    #[arg(long, short = 's', env = "FLEETMIRROR_SERVER", global = true)]
    pub server: Option<String>,

    /// Event stream URL (derived from the server URL when unset)
    #[arg(long, env = "FLEETMIRROR_EVENT_URL", global = true)]
    pub event_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FLEETMIRROR_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Colorize output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// More log output; repeat for more detail
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Answer yes to confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', env = "FLEETMIRROR_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FLEETMIRROR_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Seconds to wait before reconnecting the event stream (overrides profile)
    #[arg(long, env = "FLEETMIRROR_RECONNECT_DELAY", global = true)]
    pub reconnect_delay: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// Pretty-printed JSON
    Json,
    /// JSON on a single line
    JsonCompact,
    /// YAML
    Yaml,
    /// Bare identifiers, one per line
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Color when stdout is a terminal
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Follow the live event stream (device changes, session state, frames)
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// List, inspect, and remove devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Scan the network for devices
    Scan(ScanArgs),

    /// Show aggregate backend counters
    Status,

    /// Update the scan network configuration
    #[command(alias = "net")]
    Network(NetworkArgs),

    /// Inspect and edit backend profiles
    Config(ConfigArgs),

    /// Print a shell completion script
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Also report incoming screen frames
    #[arg(long)]
    pub frames: bool,

    /// Stop after this many seconds (runs until Ctrl-C otherwise)
    #[arg(long, value_name = "SECS")]
    pub duration: Option<u64>,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List known devices
    #[command(alias = "ls")]
    List {
        /// Only show devices in this reachability state
        #[arg(long, short = 'f', default_value = "all")]
        filter: Reachability,

        /// Only show devices whose status label matches exactly
        #[arg(long, conflicts_with = "filter")]
        status: Option<String>,
    },

    /// Show one device
    Get {
        /// Device ID
        device: String,
    },

    /// Remove a device from the backend
    #[command(alias = "rm")]
    Remove {
        /// Device ID
        device: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Reachability {
    All,
    Online,
    Offline,
}

// ── Scan ─────────────────────────────────────────────────────────────

/// Without range flags the backend scans its whole configured range.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// First three octets, e.g. 192.168.31
    #[arg(long)]
    pub base_ip: Option<String>,

    /// First host number to probe
    #[arg(long)]
    pub start: Option<u32>,

    /// Last host number to probe (inclusive)
    #[arg(long)]
    pub end: Option<u32>,
}

impl ScanArgs {
    pub fn is_ranged(&self) -> bool {
        self.base_ip.is_some() || self.start.is_some() || self.end.is_some()
    }
}

// ── Network ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworkArgs {
    #[command(subcommand)]
    pub command: NetworkCommand,
}

#[derive(Debug, Subcommand)]
pub enum NetworkCommand {
    /// Push a new scan configuration; unset fields keep their defaults
    Set {
        #[arg(long)]
        base_ip: Option<String>,

        #[arg(long)]
        start: Option<u32>,

        #[arg(long)]
        end: Option<u32>,

        /// Port probed to detect devices
        #[arg(long)]
        detect_port: Option<u16>,

        /// Port frames are streamed from
        #[arg(long)]
        stream_port: Option<u16>,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or replace a profile
    Init {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Make this the default profile
        #[arg(long)]
        set_default: bool,
    },

    /// Show the current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// List profiles
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
