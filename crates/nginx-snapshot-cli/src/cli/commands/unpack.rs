//! `ngx-snapshot unpack` - List or extract the files in a saved snapshot.

use anyhow::{Context as _, Result};
use serde::Serialize;
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};

use nginx_snapshot::{unpack_snapshot, ArchiveEntry};

use super::{read_snapshot, Context};
use crate::cli::args::UnpackArgs;
use crate::output::{heading, print_json, OutputFormat};

#[derive(Serialize)]
struct Listed<'a> {
    archive: &'static str,
    path: String,
    mode: String,
    size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    written_to: Option<&'a Path>,
}

pub fn execute(ctx: &Context, args: &UnpackArgs) -> Result<()> {
    let snapshot = read_snapshot(&args.source.snapshot)?;
    let unpacked = unpack_snapshot(&snapshot)?;

    let mut written = Vec::new();
    if let Some(dest) = &args.dest {
        for entry in unpacked.config.iter().chain(&unpacked.aux) {
            written.push(extract(dest, entry)?);
        }
    }

    let entries = unpacked
        .config
        .iter()
        .map(|e| ("config", e))
        .chain(unpacked.aux.iter().map(|e| ("aux", e)));

    match ctx.output_format {
        OutputFormat::Json => {
            let listed: Vec<Listed<'_>> = entries
                .enumerate()
                .map(|(i, (archive, e))| Listed {
                    archive,
                    path: e.path.display().to_string(),
                    mode: format!("{:04o}", e.mode & 0o777),
                    size: e.contents.len(),
                    written_to: written.get(i).map(PathBuf::as_path),
                })
                .collect();
            print_json(&listed)?;
        }
        OutputFormat::Pretty => {
            println!("{}", heading("Files", ctx.no_color));
            for (i, (archive, e)) in entries.enumerate() {
                let target = written
                    .get(i)
                    .map(|p| format!(" -> {}", p.display()))
                    .unwrap_or_default();
                println!(
                    "  {archive:<6} {:04o} {:>8}  {}{target}",
                    e.mode & 0o777,
                    e.contents.len(),
                    e.path.display()
                );
            }
        }
    }
    Ok(())
}

/// Write `entry` under `dest`, mirroring its absolute path.
fn extract(dest: &Path, entry: &ArchiveEntry) -> Result<PathBuf> {
    let relative: PathBuf = entry
        .path
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    let target = dest.join(relative);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&target, &entry.contents)
        .with_context(|| format!("failed to write {}", target.display()))?;
    std::fs::set_permissions(&target, std::fs::Permissions::from_mode(entry.mode & 0o777))
        .with_context(|| format!("failed to set mode on {}", target.display()))?;
    Ok(target)
}
