//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Snapshot an NGINX configuration tree
///
/// Parses the configuration and everything it includes, reports logs,
/// certificates and status endpoints, and packs the configuration plus
/// allow-listed referenced files into checksummed archives.
#[derive(Parser, Debug)]
#[command(name = "ngx-snapshot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file (defaults to config.toml in the user config directory)
    #[arg(short, long, env = "NGX_SNAPSHOT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Log filter when RUST_LOG is unset (e.g. `info`, `nginx_snapshot=debug`)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a snapshot of a configuration
    Snapshot(SnapshotArgs),

    /// List or extract the files held by a saved snapshot
    Unpack(UnpackArgs),

    /// Find a reachable status endpoint
    Probe(ProbeArgs),

    /// Show declared access and error logs
    Logs(ConfigPathArgs),

    /// Show App Protect policy and log profile files of a saved snapshot
    Waf(SnapshotFileArgs),
}

#[derive(Args, Debug)]
pub struct ConfigPathArgs {
    /// Root configuration file
    #[arg(default_value = "/etc/nginx/nginx.conf")]
    pub nginx_conf: PathBuf,
}

#[derive(Args, Debug)]
pub struct SnapshotFileArgs {
    /// Snapshot JSON written by `ngx-snapshot snapshot`
    pub snapshot: PathBuf,
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub target: ConfigPathArgs,

    /// Instance identifier recorded in the snapshot
    #[arg(long, default_value = "")]
    pub instance_id: String,

    /// System identifier recorded in the snapshot
    #[arg(long, default_value = "")]
    pub system_id: String,

    /// Directory whose files may enter the auxiliary archive (repeatable)
    #[arg(short, long = "allow", value_name = "DIR")]
    pub allow: Vec<PathBuf>,

    /// Skip missing include targets instead of failing
    #[arg(long)]
    pub lenient_includes: bool,

    /// Only read the root configuration file
    #[arg(long, conflicts_with = "lenient_includes")]
    pub no_includes: bool,

    /// Write the snapshot JSON to this file
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct UnpackArgs {
    #[command(flatten)]
    pub source: SnapshotFileArgs,

    /// Extract files under this directory instead of listing them
    #[arg(short, long, value_name = "DIR")]
    pub dest: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub target: ConfigPathArgs,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,
}
