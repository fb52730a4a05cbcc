//! Fact extraction from a parsed configuration.
//!
//! [`FactCollector`] is driven by [`crate::traverse`]. Each directive name
//! maps to one handler; unknown directives are ignored.

pub mod certs;
pub mod endpoints;
pub mod logs;
pub mod waf;

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::trace;

use nginx_snapshot_core::{AccessLog, ErrorLog, Result};

use crate::directive::{Directive, Payload};
use crate::paths;
use crate::traverse::traverse;

pub use endpoints::{EndpointCollector, StatusEndpoints};

/// A file the configuration depends on that may belong in the auxiliary
/// archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuxReference {
    Certificate(PathBuf),
    WafFile(PathBuf),
    /// A `root` directory, archived recursively
    Root(PathBuf),
}

/// Everything extracted in one traversal.
#[derive(Debug, Clone, Default)]
pub struct Facts {
    pub access_logs: Vec<AccessLog>,
    pub error_logs: Vec<ErrorLog>,
    /// Unique certificate paths in first-seen order
    pub certificates: Vec<PathBuf>,
    /// Policy file base names, duplicates kept
    pub policies: Vec<String>,
    /// Security log profile base names, duplicates kept
    pub profiles: Vec<String>,
    pub endpoints: StatusEndpoints,
    /// Auxiliary file references in traversal order
    pub aux: Vec<AuxReference>,
}

type Handler = fn(&mut FactCollector, Option<&Directive>, &Directive);

/// Visitor that accumulates [`Facts`].
pub struct FactCollector {
    handlers: HashMap<&'static str, Handler>,
    log_formats: HashMap<String, String>,
    endpoints: EndpointCollector,
    facts: Facts,
}

impl Default for FactCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl FactCollector {
    #[must_use]
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Handler> = HashMap::new();
        handlers.insert("access_log", Self::on_access_log);
        handlers.insert("error_log", Self::on_error_log);
        handlers.insert("log_format", Self::on_log_format);
        handlers.insert(waf::POLICY_FILE, Self::on_policy_file);
        handlers.insert(waf::SECURITY_LOG, Self::on_security_log);
        handlers.insert("root", Self::on_root);
        handlers.insert("server", Self::on_server_or_location);
        handlers.insert("location", Self::on_server_or_location);
        for name in certs::CERTIFICATE_DIRECTIVES {
            handlers.insert(*name, Self::on_certificate);
        }
        Self {
            handlers,
            log_formats: HashMap::new(),
            endpoints: EndpointCollector::new(),
            facts: Facts::default(),
        }
    }

    /// Dispatch one directive. Never prunes the walk.
    pub fn visit(&mut self, parent: Option<&Directive>, current: &Directive) -> bool {
        if let Some(handler) = self.handlers.get(current.name.as_str()).copied() {
            trace!(directive = %current.name, file = %current.file.display(), line = current.line, "extracting");
            handler(self, parent, current);
        }
        true
    }

    /// Resolve access log format names and return the collected facts.
    #[must_use]
    pub fn finish(mut self) -> Facts {
        for log in &mut self.facts.access_logs {
            logs::resolve_format(log, &self.log_formats);
        }
        self.facts.endpoints = self.endpoints.finish();
        self.facts
    }

    fn on_access_log(&mut self, _: Option<&Directive>, current: &Directive) {
        self.facts.access_logs.extend(logs::access_log(current));
    }

    fn on_error_log(&mut self, _: Option<&Directive>, current: &Directive) {
        self.facts.error_logs.extend(logs::error_log(current));
    }

    fn on_log_format(&mut self, _: Option<&Directive>, current: &Directive) {
        if let Some((name, format)) = logs::log_format(current) {
            self.log_formats.insert(name, format);
        }
    }

    fn on_certificate(&mut self, _: Option<&Directive>, current: &Directive) {
        let Some(path) = certs::certificate_path(current) else {
            return;
        };
        if !self.facts.certificates.contains(&path) {
            self.facts.certificates.push(path.clone());
        }
        self.facts.aux.push(AuxReference::Certificate(path));
    }

    fn on_policy_file(&mut self, _: Option<&Directive>, current: &Directive) {
        if let Some(path) = waf::policy_file(current) {
            self.facts.policies.push(waf::basename(&path));
            self.facts.aux.push(AuxReference::WafFile(path));
        }
    }

    fn on_security_log(&mut self, _: Option<&Directive>, current: &Directive) {
        if let Some(path) = waf::security_log_profile(current) {
            self.facts.profiles.push(waf::basename(&path));
            self.facts.aux.push(AuxReference::WafFile(path));
        }
    }

    fn on_root(&mut self, _: Option<&Directive>, current: &Directive) {
        let Some(arg) = current.first_arg().filter(|a| !paths::is_variable(a)) else {
            return;
        };
        let dir = paths::resolve(current.source_dir(), arg);
        self.facts.aux.push(AuxReference::Root(dir));
    }

    fn on_server_or_location(&mut self, parent: Option<&Directive>, current: &Directive) {
        self.endpoints.visit(parent, current);
    }
}

/// Run a [`FactCollector`] over `payload`.
pub fn collect_facts(payload: &Payload) -> Result<Facts> {
    let mut collector = FactCollector::new();
    traverse(payload, |parent, current| Ok(collector.visit(parent, current)))?;
    Ok(collector.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, ParseOptions};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn one_pass_collects_everything() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nginx.conf");
        fs::write(
            dir.path().join("site.conf"),
            "server {\n\
               listen 127.0.0.1:80;\n\
               ssl_certificate certs/site.crt;\n\
               ssl_certificate_key certs/site.key;\n\
               root /srv/www;\n\
               location /api { api; }\n\
             }",
        )
        .unwrap();
        fs::write(
            &root,
            "error_log /var/log/nginx/error.log notice;\n\
             http {\n\
               access_log /var/log/nginx/access.log main;\n\
               log_format main '$remote_addr ' '$status';\n\
               ssl_trusted_certificate certs/site.crt;\n\
               app_protect_policy_file /etc/waf/policy.json;\n\
               include site.conf;\n\
             }",
        )
        .unwrap();

        let payload = parse(&root, &ParseOptions::default()).unwrap();
        let facts = collect_facts(&payload).unwrap();

        assert_eq!(facts.error_logs.len(), 1);
        assert_eq!(facts.error_logs[0].log_level, "notice");
        assert_eq!(facts.access_logs[0].format, "$remote_addr $status");
        assert_eq!(facts.certificates, vec![dir.path().join("certs/site.crt")]);
        assert_eq!(facts.policies, vec!["policy.json"]);
        assert_eq!(facts.endpoints.plus, vec!["http://127.0.0.1:80/api"]);
        assert_eq!(
            facts.aux,
            vec![
                AuxReference::Certificate(dir.path().join("certs/site.crt")),
                AuxReference::WafFile(PathBuf::from("/etc/waf/policy.json")),
                AuxReference::Certificate(dir.path().join("certs/site.crt")),
                AuxReference::Root(PathBuf::from("/srv/www")),
            ]
        );
    }

    #[test]
    fn unknown_directives_are_ignored() {
        let mut collector = FactCollector::new();
        let parsed = crate::parser::parse_str("gzip on;", std::path::Path::new("/etc/nginx/nginx.conf")).unwrap();
        assert!(collector.visit(None, &parsed[0]));
        let facts = collector.finish();
        assert!(facts.aux.is_empty());
        assert!(facts.access_logs.is_empty());
    }
}
