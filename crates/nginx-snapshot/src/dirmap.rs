//! Directory map accumulation.

use std::collections::HashMap;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use nginx_snapshot_core::{Directory, DirectoryMap, File, Result, SnapshotError};

use crate::paths;

/// Builds a [`DirectoryMap`] one file at a time.
///
/// Directories keep first-discovery order and each basename is recorded
/// once per directory.
#[derive(Debug, Default)]
pub struct DirectoryMapBuilder {
    directories: Vec<Directory>,
    index: HashMap<String, usize>,
}

impl DirectoryMapBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue building on top of an existing map.
    #[must_use]
    pub fn from_map(map: DirectoryMap) -> Self {
        let index = map
            .directories
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        Self {
            directories: map.directories,
            index,
        }
    }

    /// Record `path` under its containing directory.
    ///
    /// Returns `Ok(false)` when the basename was already present.
    pub fn record(&mut self, path: &Path) -> Result<bool> {
        let path = paths::clean(path);
        let (Some(dir), Some(name)) = (path.parent(), path.file_name()) else {
            return Ok(false);
        };
        let dir_name = dir.display().to_string();
        let file_name = name.to_string_lossy().into_owned();

        if let Some(&idx) = self.index.get(&dir_name) {
            if self.directories[idx].contains(&file_name) {
                return Ok(false);
            }
        }

        let file_meta = stat(&path)?;
        let file = File {
            name: file_name,
            permissions: paths::permissions(file_meta.mode()),
            size: file_meta.len(),
        };

        let idx = match self.index.get(&dir_name) {
            Some(&idx) => idx,
            None => {
                let dir_meta = stat(dir)?;
                self.directories.push(Directory {
                    name: dir_name.clone(),
                    permissions: paths::permissions(dir_meta.mode()),
                    files: Vec::new(),
                    size: dir_meta.len(),
                });
                let idx = self.directories.len() - 1;
                self.index.insert(dir_name, idx);
                idx
            }
        };
        self.directories[idx].files.push(file);
        Ok(true)
    }

    #[must_use]
    pub fn finish(self) -> DirectoryMap {
        DirectoryMap {
            directories: self.directories,
        }
    }
}

fn stat(path: &Path) -> Result<std::fs::Metadata> {
    std::fs::metadata(path).map_err(|e| SnapshotError::FileStat {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn files_grouped_by_directory_in_discovery_order() {
        let tmp = TempDir::new().unwrap();
        let conf = tmp.path().join("nginx");
        let www = tmp.path().join("www");
        fs::create_dir_all(&conf).unwrap();
        fs::create_dir_all(&www).unwrap();
        fs::write(conf.join("nginx.conf"), "events {}").unwrap();
        fs::write(www.join("index.html"), "<html></html>").unwrap();
        fs::write(conf.join("ca.crt"), "cert").unwrap();
        fs::set_permissions(conf.join("ca.crt"), fs::Permissions::from_mode(0o600)).unwrap();

        let mut builder = DirectoryMapBuilder::new();
        assert!(builder.record(&conf.join("nginx.conf")).unwrap());
        assert!(builder.record(&www.join("index.html")).unwrap());
        assert!(builder.record(&conf.join("ca.crt")).unwrap());
        let map = builder.finish();

        let names: Vec<_> = map.directories.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec![conf.to_str().unwrap(), www.to_str().unwrap()]);
        let files: Vec<_> = map.directories[0].files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(files, vec!["nginx.conf", "ca.crt"]);
        assert_eq!(map.directories[0].files[1].permissions, "0600");
        assert_eq!(map.directories[0].files[1].size, 4);
        assert_eq!(map.file_count(), 3);
    }

    #[test]
    fn repeated_basename_is_recorded_once() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("site.crt");
        fs::write(&file, "x").unwrap();

        let mut builder = DirectoryMapBuilder::new();
        assert!(builder.record(&file).unwrap());
        assert!(!builder.record(&file).unwrap());
        assert!(!builder.record(&tmp.path().join("./site.crt")).unwrap());
        assert_eq!(builder.finish().file_count(), 1);
    }

    #[test]
    fn missing_file_creates_no_directory() {
        let tmp = TempDir::new().unwrap();
        let mut builder = DirectoryMapBuilder::new();
        let err = builder.record(&tmp.path().join("absent.conf")).unwrap_err();
        assert!(matches!(err, SnapshotError::FileStat { .. }));
        assert!(builder.finish().is_empty());
    }

    #[test]
    fn extends_existing_map() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.conf"), "").unwrap();
        fs::write(tmp.path().join("b.conf"), "").unwrap();

        let mut first = DirectoryMapBuilder::new();
        first.record(&tmp.path().join("a.conf")).unwrap();
        let mut second = DirectoryMapBuilder::from_map(first.finish());
        assert!(!second.record(&tmp.path().join("a.conf")).unwrap());
        assert!(second.record(&tmp.path().join("b.conf")).unwrap());
        let map = second.finish();
        assert_eq!(map.directories.len(), 1);
        assert_eq!(map.file_count(), 2);
    }
}
