//! Command implementations.

pub mod logs;
pub mod probe;
pub mod snapshot;
pub mod unpack;
pub mod waf;

use anyhow::{Context as _, Result};
use std::path::Path;

use nginx_snapshot::{ConfigSnapshot, SnapshotConfig};

use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Engine settings from the config file
    pub settings: SnapshotConfig,

    /// Output format
    pub output_format: OutputFormat,

    /// Disable colors
    pub no_color: bool,
}

/// Read a snapshot previously saved as JSON.
pub fn read_snapshot(path: &Path) -> Result<ConfigSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a snapshot", path.display()))
}
