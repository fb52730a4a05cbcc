//! Configuration file discovery.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use nginx_snapshot::SnapshotConfig;

/// Default config file path (`config.toml` in the platform config directory).
pub fn path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("io", "nginx-snapshot", "ngx-snapshot")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    Ok(dirs.config_dir().join("config.toml"))
}

/// Load engine settings from `explicit` or the default location.
///
/// A missing default file yields defaults; a missing explicit file is an
/// error.
pub fn load(explicit: Option<&Path>) -> Result<SnapshotConfig> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            SnapshotConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))
        }
        None => {
            let path = path()?;
            SnapshotConfig::load(&path)
                .with_context(|| format!("failed to load {}", path.display()))
        }
    }
}
