//! NGINX App Protect (WAF) policy and log profile references.

use std::path::{Path, PathBuf};

use nginx_snapshot_core::Result;

use crate::directive::{Directive, Payload};
use crate::paths;
use crate::traverse::traverse;

pub const POLICY_FILE: &str = "app_protect_policy_file";
pub const SECURITY_LOG: &str = "app_protect_security_log";

/// `app_protect_policy_file <file>;`
pub fn policy_file(directive: &Directive) -> Option<PathBuf> {
    match directive.args.as_slice() {
        [file] => resolve(directive, file),
        _ => None,
    }
}

/// `app_protect_security_log <profile file> <destination>;`
pub fn security_log_profile(directive: &Directive) -> Option<PathBuf> {
    match directive.args.as_slice() {
        [profile, _destination] => resolve(directive, profile),
        _ => None,
    }
}

fn resolve(directive: &Directive, arg: &str) -> Option<PathBuf> {
    if paths::is_variable(arg) {
        return None;
    }
    Some(paths::resolve(directive.source_dir(), arg))
}

/// File name component as reported to the control plane.
pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Policy and log profile files referenced anywhere in `payload`, in
/// traversal order, duplicates kept.
pub fn waf_files(payload: &Payload) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut policies = Vec::new();
    let mut profiles = Vec::new();
    traverse(payload, |_, current| {
        if current.is(POLICY_FILE) {
            policies.extend(policy_file(current));
        } else if current.is(SECURITY_LOG) {
            profiles.extend(security_log_profile(current));
        }
        Ok(true)
    })?;
    Ok((policies, profiles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseOptions};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn arity_is_checked() {
        let conf = Path::new("/etc/nginx/nginx.conf");
        let parsed = crate::parser::parse_str(
            "app_protect_policy_file /etc/app_protect/conf/a.json;\n\
             app_protect_policy_file a.json b.json;\n\
             app_protect_security_log /etc/app_protect/conf/log_all.json syslog:server=127.0.0.1:514;\n\
             app_protect_security_log /etc/app_protect/conf/log_all.json;",
            conf,
        )
        .unwrap();
        assert_eq!(policy_file(&parsed[0]), Some(PathBuf::from("/etc/app_protect/conf/a.json")));
        assert_eq!(policy_file(&parsed[1]), None);
        assert_eq!(
            security_log_profile(&parsed[2]),
            Some(PathBuf::from("/etc/app_protect/conf/log_all.json"))
        );
        assert_eq!(security_log_profile(&parsed[3]), None);
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nginx.conf");
        fs::write(
            &root,
            "http {\n\
               app_protect_policy_file /etc/waf/policy.json;\n\
               server { location / { app_protect_policy_file /etc/waf/policy.json; } }\n\
               app_protect_security_log /etc/waf/log_default.json stderr;\n\
             }",
        )
        .unwrap();
        let payload = parse(&root, &ParseOptions::default()).unwrap();
        let (policies, profiles) = waf_files(&payload).unwrap();
        let names: Vec<_> = policies.iter().map(|p| basename(p)).collect();
        assert_eq!(names, vec!["policy.json", "policy.json"]);
        assert_eq!(profiles, vec![PathBuf::from("/etc/waf/log_default.json")]);
    }
}
