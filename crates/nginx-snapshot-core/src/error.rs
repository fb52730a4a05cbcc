use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for snapshot operations
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Errors that can occur while building or reading a configuration snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Configuration text is malformed
    #[error("{}: {reason}", location(file, *line))]
    Parse {
        /// File containing the error
        file: PathBuf,
        /// Line number, when known
        line: Option<usize>,
        /// What the parser expected or found
        reason: String,
    },

    /// A configuration file could not be read
    #[error("failed to read configuration {}: {source}", path.display())]
    ConfigRead {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// An `include` directive points at a file that does not exist
    #[error("{}: include target {target} not found", location(file, Some(*line)))]
    MissingInclude {
        /// File containing the `include`
        file: PathBuf,
        /// Line of the `include`
        line: usize,
        /// Resolved include target
        target: String,
    },

    /// A certificate file could not be decoded
    #[error("failed to decode certificate {}: {reason}", path.display())]
    CertificateDecode {
        /// Certificate path
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// A referenced file could not be stat'ed
    #[error("failed to stat {}: {source}", path.display())]
    FileStat {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Generic I/O failure on a path
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Archive could not be written or read
    #[error("archive error: {0}")]
    Archive(String),

    /// Archive contents do not match the recorded checksum
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Checksum recorded alongside the archive
        expected: String,
        /// Checksum computed from the archive entries
        actual: String,
    },

    /// No status endpoint answered
    #[error("no reachable status endpoint (tried {})", tried.join(", "))]
    NoReachableEndpoint {
        /// Candidate URLs in the order they were tried
        tried: Vec<String>,
    },

    /// Engine configuration is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SnapshotError {
    /// Build an [`SnapshotError::Io`] from a path and an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a [`SnapshotError::Parse`] error
    pub fn parse(file: impl Into<PathBuf>, line: Option<usize>, reason: impl Into<String>) -> Self {
        Self::Parse {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Returns true if the error must abort a snapshot build.
    ///
    /// Certificate, stat and probe failures only degrade a single fact.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::CertificateDecode { .. } | Self::FileStat { .. } | Self::NoReachableEndpoint { .. }
        )
    }

    /// Returns the configuration file the error points at, if any
    #[must_use]
    pub fn file(&self) -> Option<&std::path::Path> {
        match self {
            Self::Parse { file, .. } | Self::MissingInclude { file, .. } => Some(file),
            Self::ConfigRead { path, .. }
            | Self::CertificateDecode { path, .. }
            | Self::FileStat { path, .. }
            | Self::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

fn location(file: &std::path::Path, line: Option<usize>) -> String {
    match line {
        Some(line) => format!("{}:{line}", file.display()),
        None => file.display().to_string(),
    }
}
