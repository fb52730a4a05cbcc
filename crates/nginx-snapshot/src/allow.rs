//! Allow-list gate for the auxiliary archive.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::paths;

/// Administrator-approved directories.
///
/// A file is permitted when its containing directory equals, or is nested
/// under, one of the entries. Matching is per path component after lexical
/// normalization, so `/etc/nginx/` permits `/etc/nginx/ssl/site.crt` but
/// `/etc/nginx` does not permit `/etc/nginx2/site.crt`.
///
/// A file that exists must also resolve, after following symlinks, to a
/// location under the resolved form of an allowed directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedDirectories {
    dirs: Vec<PathBuf>,
    /// `dirs` with symlinks resolved; the lexical path when resolution fails
    resolved: Vec<PathBuf>,
}

impl AllowedDirectories {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut cleaned: Vec<PathBuf> = Vec::new();
        for dir in dirs {
            let dir = paths::clean(dir.as_ref());
            if !cleaned.contains(&dir) {
                cleaned.push(dir);
            }
        }
        let resolved = cleaned
            .iter()
            .map(|dir| std::fs::canonicalize(dir).unwrap_or_else(|_| dir.clone()))
            .collect();
        Self {
            dirs: cleaned,
            resolved,
        }
    }

    /// Whether `file` may be placed in the auxiliary archive.
    #[must_use]
    pub fn permits(&self, file: &Path) -> bool {
        let file = paths::clean(file);
        let Some(dir) = file.parent() else {
            return false;
        };
        if !self.dirs.iter().any(|allowed| dir.starts_with(allowed)) {
            return false;
        }
        if std::fs::symlink_metadata(&file).is_err() {
            return true;
        }
        match std::fs::canonicalize(&file) {
            Ok(real) => {
                let permitted = real
                    .parent()
                    .is_some_and(|parent| self.resolved.iter().any(|allowed| parent.starts_with(allowed)));
                if !permitted {
                    debug!(path = %file.display(), target = %real.display(), "symlink leaves allowed directories");
                }
                permitted
            }
            Err(e) => {
                debug!(path = %file.display(), error = %e, "cannot resolve path");
                false
            }
        }
    }

    /// Whether anything under `dir` could be permitted.
    #[must_use]
    pub fn overlaps(&self, dir: &Path) -> bool {
        let dir = paths::clean(dir);
        self.dirs
            .iter()
            .any(|allowed| dir.starts_with(allowed) || allowed.starts_with(&dir))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[test]
    fn nested_and_exact_directories_are_permitted() {
        let allowed = AllowedDirectories::new(["/tmp/testdata/nginx/"]);
        assert!(allowed.permits(Path::new("/tmp/testdata/nginx/nginx.conf")));
        assert!(allowed.permits(Path::new("/tmp/testdata/nginx/ssl/ca.crt")));
        assert!(allowed.permits(Path::new("/tmp/testdata/nginx/ssl/../ca.crt")));
    }

    #[test]
    fn siblings_and_parents_are_rejected() {
        let allowed = AllowedDirectories::new(["/etc/nginx"]);
        assert!(!allowed.permits(Path::new("/etc/nginx2/site.crt")));
        assert!(!allowed.permits(Path::new("/etc/site.crt")));
        assert!(!allowed.permits(Path::new("/etc/nginx/../passwd")));
    }

    #[test]
    fn empty_list_permits_nothing() {
        let allowed = AllowedDirectories::default();
        assert!(allowed.is_empty());
        assert!(!allowed.permits(Path::new("/etc/nginx/nginx.conf")));
    }

    #[test]
    fn overlap_covers_both_directions() {
        let allowed = AllowedDirectories::new(["/srv/www/static", "/srv/www/static/"]);
        assert_eq!(allowed.iter().count(), 1);
        assert!(allowed.overlaps(Path::new("/srv/www")));
        assert!(allowed.overlaps(Path::new("/srv/www/static/img")));
        assert!(!allowed.overlaps(Path::new("/var/www")));
    }

    #[test]
    fn symlinks_out_of_allowed_directories_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let nginx = tmp.path().join("nginx");
        let secret = tmp.path().join("secret");
        fs::create_dir_all(&nginx).unwrap();
        fs::create_dir_all(&secret).unwrap();
        fs::write(secret.join("shadow"), "TOPSECRET").unwrap();
        fs::write(nginx.join("ca.crt"), "ca").unwrap();
        symlink(secret.join("shadow"), nginx.join("site.crt")).unwrap();
        symlink(&secret, nginx.join("html")).unwrap();
        symlink(nginx.join("ca.crt"), nginx.join("alias.crt")).unwrap();

        let allowed = AllowedDirectories::new([&nginx]);
        assert!(allowed.permits(&nginx.join("ca.crt")));
        assert!(allowed.permits(&nginx.join("alias.crt")));
        assert!(!allowed.permits(&nginx.join("site.crt")));
        assert!(!allowed.permits(&nginx.join("html/shadow")));
    }

    #[test]
    fn symlinked_allowed_directory_still_permits_its_files() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real");
        fs::create_dir_all(&real).unwrap();
        fs::write(real.join("site.crt"), "crt").unwrap();
        symlink(&real, tmp.path().join("nginx")).unwrap();

        let allowed = AllowedDirectories::new([tmp.path().join("nginx")]);
        assert!(allowed.permits(&tmp.path().join("nginx/site.crt")));
    }
}
