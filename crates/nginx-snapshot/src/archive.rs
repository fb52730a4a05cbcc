//! Snapshot archives: gzip-compressed tar with a content checksum.
//!
//! Entries are stored under their absolute path minus the leading `/`.
//! Headers carry mode and size only (mtime and ownership are zeroed), so
//! the same adds in the same order give the same bytes. The checksum is
//! SHA-256 over the sorted `(name, sha256(contents))` pairs and does not
//! depend on add order.

use std::io::Read;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::trace;

use nginx_snapshot_core::{Result, SnapshotError, ZippedFile};

use crate::hash::sha256_bytes;
use crate::paths;

fn archive_err(e: impl std::fmt::Display) -> SnapshotError {
    SnapshotError::Archive(e.to_string())
}

fn entry_name(path: &Path) -> String {
    paths::clean(path)
        .to_string_lossy()
        .trim_start_matches('/')
        .to_string()
}

fn checksum(mut digests: Vec<(String, String)>) -> String {
    digests.sort();
    let mut listing = String::new();
    for (name, digest) in &digests {
        listing.push_str(name);
        listing.push('\0');
        listing.push_str(digest);
        listing.push('\n');
    }
    sha256_bytes(listing.as_bytes())
}

/// Accumulates files into a [`ZippedFile`].
pub struct ArchiveWriter {
    root: PathBuf,
    builder: tar::Builder<GzEncoder<Vec<u8>>>,
    digests: Vec<(String, String)>,
}

impl ArchiveWriter {
    /// Start an archive whose [`ZippedFile::root_directory`] is `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        builder.mode(tar::HeaderMode::Deterministic);
        Self {
            root: root.into(),
            builder,
            digests: Vec::new(),
        }
    }

    /// Read `path` from disk and add it with its on-disk mode.
    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::open(path).map_err(|e| SnapshotError::io(path, e))?;
        let mode = file
            .metadata()
            .map_err(|e| SnapshotError::io(path, e))?
            .mode();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| SnapshotError::io(path, e))?;
        self.add(path, mode, &contents)
    }

    /// Add in-memory contents under `path`.
    pub fn add(&mut self, path: &Path, mode: u32, contents: &[u8]) -> Result<()> {
        let name = entry_name(path);
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(contents.len() as u64);
        header.set_mode(mode & 0o7777);
        header.set_mtime(0);
        header.set_uid(0);
        header.set_gid(0);
        self.builder
            .append_data(&mut header, &name, contents)
            .map_err(archive_err)?;
        trace!(entry = %name, size = contents.len(), "archived");
        self.digests.push((name, sha256_bytes(contents)));
        Ok(())
    }

    /// Whether an entry for `path` was already added
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        let name = entry_name(path);
        self.digests.iter().any(|(n, _)| *n == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Finalize into bytes plus checksum.
    pub fn finish(self) -> Result<ZippedFile> {
        let encoder = self.builder.into_inner().map_err(archive_err)?;
        let contents = encoder.finish().map_err(archive_err)?;
        Ok(ZippedFile {
            contents,
            checksum: checksum(self.digests),
            root_directory: self.root.display().to_string(),
        })
    }
}

/// One file read back from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Absolute path the file was archived from
    pub path: PathBuf,
    pub mode: u32,
    pub contents: Vec<u8>,
}

/// Verified view over a [`ZippedFile`].
#[derive(Debug)]
pub struct ArchiveReader {
    root: PathBuf,
    entries: Vec<ArchiveEntry>,
}

impl ArchiveReader {
    /// Decode `zipped` and check its checksum.
    pub fn new(zipped: &ZippedFile) -> Result<Self> {
        let mut archive = tar::Archive::new(GzDecoder::new(zipped.contents.as_slice()));
        let mut entries = Vec::new();
        let mut digests = Vec::new();

        for entry in archive.entries().map_err(archive_err)? {
            let mut entry = entry.map_err(archive_err)?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let name = entry
                .path()
                .map_err(archive_err)?
                .to_string_lossy()
                .into_owned();
            let mode = entry.header().mode().map_err(archive_err)?;
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).map_err(archive_err)?;

            digests.push((name.clone(), sha256_bytes(&contents)));
            entries.push(ArchiveEntry {
                path: Path::new("/").join(name),
                mode,
                contents,
            });
        }

        let actual = checksum(digests);
        if actual != zipped.checksum {
            return Err(SnapshotError::ChecksumMismatch {
                expected: zipped.checksum.clone(),
                actual,
            });
        }

        Ok(Self {
            root: PathBuf::from(&zipped.root_directory),
            entries,
        })
    }

    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root
    }

    /// Entries in archive order
    #[must_use]
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<ArchiveEntry> {
        self.entries
    }
}
