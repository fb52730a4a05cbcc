//! NGINX configuration parser.
//!
//! Produces a [`Payload`]: one [`ConfigFile`] per parsed file, with `include`
//! directives pointing at the files they pulled in. Each file is parsed once,
//! in the order it is first referenced, so include cycles terminate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use nginx_snapshot_core::{Result, SnapshotError};

use crate::directive::{ConfigFile, Directive, Payload};
use crate::paths;
use nginx_lint_parser::ast::ConfigItem;

/// How includes are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Parse `include` targets. When false only the root file is read.
    pub follow_includes: bool,
    /// A literal include target that does not exist aborts the parse.
    /// When false the target is skipped and recorded in
    /// [`Payload::skipped_includes`].
    pub stop_on_missing_include: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            follow_includes: true,
            stop_on_missing_include: true,
        }
    }
}

impl ParseOptions {
    /// Only parse the root file
    #[must_use]
    pub const fn single_file() -> Self {
        Self {
            follow_includes: false,
            stop_on_missing_include: true,
        }
    }

    /// Skip missing include targets instead of failing
    #[must_use]
    pub const fn lenient() -> Self {
        Self {
            follow_includes: true,
            stop_on_missing_include: false,
        }
    }
}

/// Parse a root configuration file and, per `options`, every file it includes.
pub fn parse(path: &Path, options: &ParseOptions) -> Result<Payload> {
    let root = paths::absolute(path).map_err(|e| SnapshotError::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let prefix = root
        .parent()
        .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);

    let mut includer = Includer {
        prefix,
        options,
        queue: vec![root.clone()],
        index: HashMap::from([(root, 0)]),
        skipped: Vec::new(),
    };

    let mut configs = Vec::new();
    let mut next = 0;
    while next < includer.queue.len() {
        let file = includer.queue[next].clone();
        let text = std::fs::read_to_string(&file).map_err(|e| SnapshotError::ConfigRead {
            path: file.clone(),
            source: e,
        })?;
        let mut parsed = parse_str(&text, &file)?;
        if options.follow_includes {
            includer.resolve(&mut parsed)?;
        }
        debug!(file = %file.display(), directives = parsed.len(), "parsed configuration file");
        configs.push(ConfigFile { path: file, parsed });
        next += 1;
    }

    Ok(Payload {
        configs,
        skipped_includes: includer.skipped,
    })
}

/// Parse configuration text. `include` directives are left unresolved.
pub fn parse_str(text: &str, file: &Path) -> Result<Vec<Directive>> {
    let config = nginx_lint_parser::parse_string(text)
        .map_err(|e| SnapshotError::parse(file, None, e.to_string()))?;
    Ok(directives(&config.items, file))
}

fn directives(items: &[ConfigItem], file: &Path) -> Vec<Directive> {
    items
        .iter()
        .filter_map(|item| match item {
            ConfigItem::Directive(d) => Some(Directive {
                name: d.name.clone(),
                args: d.args.iter().map(|a| unquote(&a.raw)).collect(),
                line: d.span.start.line,
                file: file.to_path_buf(),
                block: d.block.as_ref().map(|b| directives(&b.items, file)),
                includes: Vec::new(),
            }),
            _ => None,
        })
        .collect()
}

/// Argument text without its surrounding quotes.
fn unquote(raw: &str) -> String {
    for quote in ['"', '\''] {
        if let Some(inner) = raw
            .strip_prefix(quote)
            .and_then(|r| r.strip_suffix(quote))
        {
            return inner.replace(&format!("\\{quote}"), &quote.to_string());
        }
    }
    raw.to_string()
}

/// Resolves `include` targets and queues newly discovered files.
struct Includer<'a> {
    prefix: PathBuf,
    options: &'a ParseOptions,
    queue: Vec<PathBuf>,
    index: HashMap<PathBuf, usize>,
    skipped: Vec<PathBuf>,
}

impl Includer<'_> {
    fn resolve(&mut self, directives: &mut [Directive]) -> Result<()> {
        for directive in directives {
            if directive.is("include") {
                if let Some(pattern) = directive.first_arg() {
                    let targets = self.targets(directive, pattern)?;
                    directive.includes = targets.into_iter().map(|t| self.enqueue(t)).collect();
                }
            }
            if let Some(block) = directive.block.as_mut() {
                self.resolve(block)?;
            }
        }
        Ok(())
    }

    fn enqueue(&mut self, target: PathBuf) -> usize {
        if let Some(&idx) = self.index.get(&target) {
            return idx;
        }
        let idx = self.queue.len();
        self.queue.push(target.clone());
        self.index.insert(target, idx);
        idx
    }

    fn targets(&mut self, directive: &Directive, pattern: &str) -> Result<Vec<PathBuf>> {
        let resolved = paths::resolve(&self.prefix, pattern);

        if has_glob_magic(pattern) {
            let pattern_str = resolved.to_string_lossy();
            let entries = glob::glob(&pattern_str).map_err(|e| {
                SnapshotError::parse(
                    &directive.file,
                    Some(directive.line),
                    format!("invalid include pattern {pattern}: {e}"),
                )
            })?;
            let matches: Vec<PathBuf> = entries
                .filter_map(std::result::Result::ok)
                .filter(|p| p.is_file())
                .map(|p| paths::clean(&p))
                .collect();
            if matches.is_empty() {
                debug!(pattern = %pattern_str, "include pattern matched no files");
            }
            return Ok(matches);
        }

        if resolved.is_file() {
            return Ok(vec![resolved]);
        }

        if self.options.stop_on_missing_include {
            return Err(SnapshotError::MissingInclude {
                file: directive.file.clone(),
                line: directive.line,
                target: resolved.display().to_string(),
            });
        }
        warn!(
            file = %directive.file.display(),
            line = directive.line,
            target = %resolved.display(),
            "skipping missing include"
        );
        self.skipped.push(resolved);
        Ok(Vec::new())
    }
}

fn has_glob_magic(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}
