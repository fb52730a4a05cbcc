//! Auxiliary archive assembly.
//!
//! References are collected during traversal, then processed here in two
//! phases: first the set of effective `root` directories is computed
//! (nested and duplicate roots collapse into their outermost ancestor),
//! then every reference is processed in traversal order, walking each
//! effective root at most once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use nginx_snapshot_core::{DirectoryMap, Result, ZippedFile};

use crate::allow::AllowedDirectories;
use crate::archive::ArchiveWriter;
use crate::dirmap::DirectoryMapBuilder;
use crate::extract::AuxReference;
use crate::paths;

/// Outermost unique directories among `roots`, sorted.
#[must_use]
pub fn effective_roots<'a>(roots: impl IntoIterator<Item = &'a Path>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = roots.into_iter().map(paths::clean).collect();
    candidates.sort();
    candidates.dedup();

    let mut kept: Vec<PathBuf> = Vec::new();
    for dir in candidates {
        if !kept.iter().any(|k| dir.starts_with(k)) {
            kept.push(dir);
        }
    }
    kept
}

/// Per-snapshot state for the auxiliary archive.
pub struct AuxAssembler<'a> {
    allowed: &'a AllowedDirectories,
    seen: HashSet<PathBuf>,
    directory_map: DirectoryMapBuilder,
    archive: ArchiveWriter,
    walked: Vec<PathBuf>,
}

impl<'a> AuxAssembler<'a> {
    pub fn new(
        root_directory: impl Into<PathBuf>,
        allowed: &'a AllowedDirectories,
        directory_map: DirectoryMapBuilder,
    ) -> Self {
        Self {
            allowed,
            seen: HashSet::new(),
            directory_map,
            archive: ArchiveWriter::new(root_directory),
            walked: Vec::new(),
        }
    }

    /// Treat `path` as already archived elsewhere.
    pub fn mark_seen(&mut self, path: &Path) {
        self.seen.insert(paths::clean(path));
    }

    /// Seed with files already present in an existing auxiliary archive.
    pub fn preload(&mut self, path: &Path, mode: u32, contents: &[u8]) -> Result<()> {
        self.archive.add(path, mode, contents)?;
        self.seen.insert(paths::clean(path));
        Ok(())
    }

    /// Add one file if the allow-list permits it and it is not yet archived.
    ///
    /// Read failures are logged and skip the file.
    pub fn add(&mut self, path: &Path) -> bool {
        let path = paths::clean(path);
        if self.seen.contains(&path) {
            return false;
        }
        if !self.allowed.permits(&path) {
            debug!(path = %path.display(), "outside allowed directories, not archived");
            return false;
        }
        self.seen.insert(path.clone());

        if let Err(e) = self.archive.add_file(&path) {
            warn!(path = %path.display(), error = %e, "skipping auxiliary file");
            return false;
        }
        if let Err(e) = self.directory_map.record(&path) {
            warn!(path = %path.display(), error = %e, "file not recorded in directory map");
        }
        true
    }

    /// Process references in order.
    pub fn process(&mut self, refs: &[AuxReference]) {
        let effective = effective_roots(refs.iter().filter_map(|r| match r {
            AuxReference::Root(dir) => Some(dir.as_path()),
            _ => None,
        }));

        for reference in refs {
            match reference {
                AuxReference::Certificate(path) | AuxReference::WafFile(path) => {
                    self.add(path);
                }
                AuxReference::Root(dir) => {
                    let dir = paths::clean(dir);
                    if effective.contains(&dir) && !self.walked.contains(&dir) {
                        self.walk(&dir);
                    }
                }
            }
        }
    }

    fn walk(&mut self, dir: &Path) {
        self.walked.push(dir.to_path_buf());
        if !self.allowed.overlaps(dir) {
            debug!(root = %dir.display(), "root directory outside allowed directories");
            return;
        }

        let files: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .collect();
        debug!(root = %dir.display(), files = files.len(), "walking root directory");

        for file in files {
            self.add(&file);
        }
    }

    /// Number of files in the auxiliary archive
    #[must_use]
    pub fn archived(&self) -> usize {
        self.archive.len()
    }

    /// Root directories walked so far, in walk order
    #[must_use]
    pub fn walked_roots(&self) -> &[PathBuf] {
        &self.walked
    }

    /// Directory map plus the auxiliary archive, `None` when it is empty.
    pub fn finish(self) -> Result<(DirectoryMap, Option<ZippedFile>)> {
        let zaux = if self.archive.is_empty() {
            None
        } else {
            Some(self.archive.finish()?)
        };
        Ok((self.directory_map.finish(), zaux))
    }
}
