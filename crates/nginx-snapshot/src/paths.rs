//! Path helpers shared by the parser, extractors and archive assembly.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` components, fold `..` and trailing
/// separators. Does not touch the filesystem.
#[must_use]
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = out.components().count() == 1 && out.has_root();
                if at_root {
                    continue;
                }
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Resolve a directive argument against a base directory.
///
/// Absolute targets are only normalized.
#[must_use]
pub fn resolve(base_dir: &Path, target: &str) -> PathBuf {
    let target = Path::new(target);
    if target.is_absolute() {
        clean(target)
    } else {
        clean(&base_dir.join(target))
    }
}

/// Make a path absolute against the process working directory.
pub fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(clean(path))
    } else {
        Ok(clean(&std::env::current_dir()?.join(path)))
    }
}

/// Render permission bits the way the control plane expects (`0644`).
#[must_use]
pub fn permissions(mode: u32) -> String {
    format!("{:04o}", mode & 0o777)
}

/// Arguments containing variables cannot be resolved statically.
#[must_use]
pub fn is_variable(arg: &str) -> bool {
    arg.contains('$')
}
