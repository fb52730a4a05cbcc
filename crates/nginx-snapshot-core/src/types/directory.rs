use serde::{Deserialize, Serialize};

/// Inventory of every directory that holds a snapshotted file.
///
/// Directories appear in first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMap {
    /// Directories in first-discovery order
    pub directories: Vec<Directory>,
}

impl DirectoryMap {
    /// Look up a directory by absolute path
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Directory> {
        self.directories.iter().find(|d| d.name == name)
    }

    /// Total number of files across all directories
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.directories.iter().map(|d| d.files.len()).sum()
    }

    /// Returns true if no directory was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
    }
}

/// A directory and the files recorded in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    /// Absolute directory path
    pub name: String,

    /// Octal permission string of the directory
    pub permissions: String,

    /// Recorded files, unique by basename
    #[serde(default)]
    pub files: Vec<File>,

    /// On-disk size reported for the directory entry itself
    #[serde(default)]
    pub size: u64,
}

impl Directory {
    /// Returns true if a file with this basename is already recorded
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }
}

/// A single file inside a [`Directory`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Basename only
    pub name: String,

    /// Octal permission string
    pub permissions: String,

    /// Size in bytes
    pub size: u64,
}
