//! Parsed directive tree.

use std::path::{Path, PathBuf};

/// One statement of an NGINX configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive name, e.g. `listen`
    pub name: String,
    /// Arguments with quotes removed
    pub args: Vec<String>,
    /// 1-based line the directive starts on
    pub line: usize,
    /// File the directive was read from
    pub file: PathBuf,
    /// Child directives for block directives (`http { ... }`)
    pub block: Option<Vec<Directive>>,
    /// For `include`: indices into [`Payload::configs`]
    pub includes: Vec<usize>,
}

impl Directive {
    /// First argument, if any
    #[must_use]
    pub fn first_arg(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Child directives, empty for simple directives
    #[must_use]
    pub fn children(&self) -> &[Self] {
        self.block.as_deref().unwrap_or_default()
    }

    /// Returns true if this directive's name matches
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Directory containing the file this directive came from
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        self.file.parent().unwrap_or_else(|| Path::new("/"))
    }
}

/// A single parsed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub parsed: Vec<Directive>,
}

/// Result of parsing a root configuration and everything it includes.
///
/// `configs[0]` is always the root file; included files follow in the order
/// they were first referenced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    pub configs: Vec<ConfigFile>,
    /// Include targets skipped in lenient mode
    pub skipped_includes: Vec<PathBuf>,
}

impl Payload {
    /// The root configuration file
    #[must_use]
    pub fn root(&self) -> Option<&ConfigFile> {
        self.configs.first()
    }

    /// Paths of every parsed file, root first
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.configs.iter().map(|c| c.path.as_path())
    }
}
