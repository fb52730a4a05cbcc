//! `access_log`, `error_log` and `log_format` extraction.

use std::os::unix::fs::MetadataExt;
use tracing::debug;

use nginx_snapshot_core::{AccessLog, ErrorLog};

use crate::directive::Directive;
use crate::paths;

/// Targets that are not files on disk.
fn is_special_target(target: &str) -> bool {
    target == "off"
        || target == "stderr"
        || target.starts_with("syslog:")
        || target.starts_with("memory:")
        || paths::is_variable(target)
}

/// Resolved name, permission string and readability for a log target.
fn stat_target(directive: &Directive, target: &str) -> (String, String, bool) {
    if is_special_target(target) {
        return (target.to_string(), String::new(), false);
    }
    let path = paths::resolve(directive.source_dir(), target);
    match std::fs::metadata(&path) {
        Ok(meta) => (path.display().to_string(), paths::permissions(meta.mode()), true),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "log file not readable");
            (path.display().to_string(), String::new(), false)
        }
    }
}

/// Build an [`AccessLog`] from an `access_log` directive.
///
/// The format is the raw format name here; [`resolve_format`] expands it
/// once every `log_format` has been seen.
pub fn access_log(directive: &Directive) -> Option<AccessLog> {
    let target = directive.first_arg()?;
    let format = directive
        .args
        .get(1)
        .filter(|a| !a.contains('='))
        .cloned()
        .unwrap_or_default();
    let (name, permissions, readable) = stat_target(directive, target);
    Some(AccessLog {
        name,
        format,
        permissions,
        readable,
    })
}

/// Build an [`ErrorLog`] from an `error_log` directive.
pub fn error_log(directive: &Directive) -> Option<ErrorLog> {
    let target = directive.first_arg()?;
    let log_level = directive.args.get(1).cloned().unwrap_or_default();
    let (name, permissions, readable) = stat_target(directive, target);
    Some(ErrorLog {
        name,
        log_level,
        permissions,
        readable,
    })
}

/// `log_format name [escape=...] 'part' 'part';` as `(name, joined format)`.
pub fn log_format(directive: &Directive) -> Option<(String, String)> {
    let (name, rest) = directive.args.split_first()?;
    let format: String = rest
        .iter()
        .filter(|a| !a.starts_with("escape="))
        .map(String::as_str)
        .collect();
    Some((name.clone(), format))
}

/// Replace a format name with its declared format string, if any.
pub fn resolve_format(log: &mut AccessLog, formats: &std::collections::HashMap<String, String>) {
    if let Some(declared) = formats.get(&log.format) {
        log.format.clone_from(declared);
    }
}

/// Log file names, in configuration order
pub fn access_log_paths(logs: &[AccessLog]) -> Vec<String> {
    logs.iter().map(|l| l.name.clone()).collect()
}

/// Log file names, in configuration order
pub fn error_log_paths(logs: &[ErrorLog]) -> Vec<String> {
    logs.iter().map(|l| l.name.clone()).collect()
}
