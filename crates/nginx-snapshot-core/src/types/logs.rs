use serde::{Deserialize, Serialize};

/// An `access_log` target found in the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLog {
    /// Resolved log path, or the raw target (`off`, `syslog:...`)
    pub name: String,

    /// Expanded `log_format` string, the format name, or empty
    #[serde(default)]
    pub format: String,

    /// Octal permission string such as `0644`, empty when not stat'ed
    #[serde(default)]
    pub permissions: String,

    /// Whether the file could be stat'ed
    pub readable: bool,
}

/// An `error_log` target found in the configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLog {
    /// Resolved log path, or the raw target
    pub name: String,

    /// Log level argument, empty when absent
    #[serde(default)]
    pub log_level: String,

    /// Octal permission string such as `0644`, empty when not stat'ed
    #[serde(default)]
    pub permissions: String,

    /// Whether the file could be stat'ed
    pub readable: bool,
}
