//! Depth-first traversal of a parsed configuration.
//!
//! The visitor sees every directive once, parent before children, together
//! with its immediate parent (`None` at file top level). Files pulled in by
//! `include` are walked in place: their top-level directives are visited as
//! siblings under the include's parent.

use nginx_snapshot_core::Result;

use crate::directive::{Directive, Payload};

/// Walk `payload` starting from the root file.
///
/// Returning `Ok(false)` from `visit` skips that directive's children (and,
/// for `include`, the included files). Any error aborts the walk.
pub fn traverse<'a, F>(payload: &'a Payload, mut visit: F) -> Result<()>
where
    F: FnMut(Option<&'a Directive>, &'a Directive) -> Result<bool>,
{
    let Some(root) = payload.root() else {
        return Ok(());
    };
    let mut walker = Walker {
        payload: Some(payload),
        active: vec![0],
    };
    walker.walk(None, &root.parsed, &mut visit)
}

/// Walk a bare directive list. `include` directives are visited but not
/// followed.
pub fn traverse_directives<'a, F>(directives: &'a [Directive], mut visit: F) -> Result<()>
where
    F: FnMut(Option<&'a Directive>, &'a Directive) -> Result<bool>,
{
    let mut walker = Walker {
        payload: None,
        active: Vec::new(),
    };
    walker.walk(None, directives, &mut visit)
}

struct Walker<'a> {
    payload: Option<&'a Payload>,
    /// Config indices currently being walked, to cut include cycles
    active: Vec<usize>,
}

impl<'a> Walker<'a> {
    fn walk<F>(&mut self, parent: Option<&'a Directive>, list: &'a [Directive], visit: &mut F) -> Result<()>
    where
        F: FnMut(Option<&'a Directive>, &'a Directive) -> Result<bool>,
    {
        for directive in list {
            if !visit(parent, directive)? {
                continue;
            }

            for &idx in &directive.includes {
                if self.active.contains(&idx) {
                    continue;
                }
                let Some(config) = self.payload.and_then(|p| p.configs.get(idx)) else {
                    continue;
                };
                self.active.push(idx);
                let result = self.walk(parent, &config.parsed, visit);
                self.active.pop();
                result?;
            }

            if let Some(block) = &directive.block {
                self.walk(Some(directive), block, visit)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse, parse_str, ParseOptions};
    use nginx_snapshot_core::SnapshotError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn visits(directives: &[Directive]) -> Vec<(Option<String>, String)> {
        let mut seen = Vec::new();
        traverse_directives(directives, |parent, current| {
            seen.push((parent.map(|p| p.name.clone()), current.name.clone()));
            Ok(true)
        })
        .unwrap();
        seen
    }

    #[test]
    fn parent_before_children() {
        let parsed = parse_str(
            "user nginx;\nhttp { server { listen 80; } access_log off; }",
            Path::new("a.conf"),
        )
        .unwrap();
        let seen = visits(&parsed);
        assert_eq!(
            seen,
            vec![
                (None, "user".into()),
                (None, "http".into()),
                (Some("http".into()), "server".into()),
                (Some("server".into()), "listen".into()),
                (Some("http".into()), "access_log".into()),
            ]
        );
    }

    #[test]
    fn false_skips_only_that_subtree() {
        let parsed = parse_str(
            "events { use epoll; }\nhttp { server { listen 80; } }",
            Path::new("a.conf"),
        )
        .unwrap();
        let mut names = Vec::new();
        traverse_directives(&parsed, |_, current| {
            names.push(current.name.clone());
            Ok(current.name != "events")
        })
        .unwrap();
        assert_eq!(names, vec!["events", "http", "server", "listen"]);
    }

    #[test]
    fn visitor_error_aborts() {
        let parsed = parse_str("a; b; c;", Path::new("a.conf")).unwrap();
        let mut count = 0;
        let result = traverse_directives(&parsed, |_, current| {
            count += 1;
            if current.name == "b" {
                return Err(SnapshotError::Config("stop".into()));
            }
            Ok(true)
        });
        assert!(result.is_err());
        assert_eq!(count, 2);
    }

    #[test]
    fn included_directives_keep_enclosing_parent() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nginx.conf");
        fs::write(dir.path().join("site.conf"), "server { listen 8080; }").unwrap();
        fs::write(&root, "http { include site.conf; }").unwrap();

        let payload = parse(&root, &ParseOptions::default()).unwrap();
        let mut seen = Vec::new();
        traverse(&payload, |parent, current| {
            seen.push((parent.map(|p| p.name.clone()), current.name.clone()));
            Ok(true)
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                (None, "http".into()),
                (Some("http".into()), "include".into()),
                (Some("http".into()), "server".into()),
                (Some("server".into()), "listen".into()),
            ]
        );
    }

    #[test]
    fn include_cycle_is_walked_once() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nginx.conf");
        fs::write(&root, "include other.conf; worker_processes 1;").unwrap();
        fs::write(dir.path().join("other.conf"), "include nginx.conf; user nginx;").unwrap();

        let payload = parse(&root, &ParseOptions::default()).unwrap();
        let mut names = Vec::new();
        traverse(&payload, |_, current| {
            names.push(current.name.clone());
            Ok(true)
        })
        .unwrap();
        assert_eq!(names, vec!["include", "include", "user", "worker_processes"]);
    }
}
