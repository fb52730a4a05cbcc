//! Engine configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use nginx_snapshot_core::{Result, SnapshotError};

use crate::allow::AllowedDirectories;
use crate::parser::ParseOptions;

/// Snapshot settings, usually read from a TOML file.
///
/// ```toml
/// allowed_directories = ["/etc/nginx", "/usr/share/nginx/html"]
/// stop_on_missing_include = false
/// probe_timeout_secs = 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Directories whose files may go into the auxiliary archive
    pub allowed_directories: Vec<PathBuf>,

    /// Parse files pulled in by `include`
    pub follow_includes: bool,

    /// Abort when a literal `include` target is missing
    pub stop_on_missing_include: bool,

    /// Per-request timeout for status endpoint probing
    pub probe_timeout_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            allowed_directories: Vec::new(),
            follow_includes: true,
            stop_on_missing_include: true,
            probe_timeout_secs: 5,
        }
    }
}

impl SnapshotConfig {
    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| SnapshotError::io(path, e))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SnapshotError::Config(e.to_string()))
    }

    #[must_use]
    pub const fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            follow_includes: self.follow_includes,
            stop_on_missing_include: self.stop_on_missing_include,
        }
    }

    #[must_use]
    pub fn allowed(&self) -> AllowedDirectories {
        AllowedDirectories::new(&self.allowed_directories)
    }

    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let config = SnapshotConfig::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, SnapshotConfig::default());
        assert_eq!(config.parse_options(), ParseOptions::default());
        assert!(config.allowed().is_empty());
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            "allowed_directories = [\"/etc/nginx/\"]\nstop_on_missing_include = false\n",
        )
        .unwrap();

        let config = SnapshotConfig::load(&path).unwrap();
        assert_eq!(config.parse_options(), ParseOptions::lenient());
        assert!(config.allowed().permits(Path::new("/etc/nginx/nginx.conf")));
        assert_eq!(config.probe_timeout_secs, 5);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = SnapshotConfig::from_toml("allowed_directories = 3").unwrap_err();
        assert!(matches!(err, SnapshotError::Config(_)));
    }
}
