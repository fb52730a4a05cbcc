//! `ngx-snapshot snapshot` - Build a configuration snapshot.

use anyhow::{Context as _, Result};
use chrono::Utc;
use tracing::info;

use nginx_snapshot::{collect_snapshot_with, AllowedDirectories, ConfigSnapshot, ParseOptions};

use super::Context;
use crate::cli::args::SnapshotArgs;
use crate::output::{heading, print_json, OutputFormat};

pub fn execute(ctx: &Context, args: SnapshotArgs) -> Result<()> {
    let allowed = AllowedDirectories::new(
        ctx.settings
            .allowed_directories
            .iter()
            .chain(args.allow.iter()),
    );

    let mut options = ctx.settings.parse_options();
    if args.lenient_includes {
        options.stop_on_missing_include = false;
    }
    if args.no_includes {
        options = ParseOptions::single_file();
    }

    let snapshot = collect_snapshot_with(
        &args.target.nginx_conf,
        &args.instance_id,
        &args.system_id,
        &allowed,
        &options,
    )?;

    if let Some(path) = &args.save {
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "snapshot saved");
    }

    match ctx.output_format {
        OutputFormat::Json => print_json(&snapshot)?,
        OutputFormat::Pretty => print_summary(ctx, &snapshot),
    }
    Ok(())
}

fn print_summary(ctx: &Context, snapshot: &ConfigSnapshot) {
    println!("{}", heading("Directories", ctx.no_color));
    for dir in &snapshot.directory_map.directories {
        println!("  {} ({})", dir.name, dir.permissions);
        for file in &dir.files {
            println!("    {:<32} {}  {:>8} bytes", file.name, file.permissions, file.size);
        }
    }

    println!("{}", heading("Logs", ctx.no_color));
    for log in &snapshot.access_logs {
        let readable = if log.readable { "" } else { " (unreadable)" };
        println!("  access {} [{}]{readable}", log.name, log.format);
    }
    for log in &snapshot.error_logs {
        let readable = if log.readable { "" } else { " (unreadable)" };
        println!("  error  {} [{}]{readable}", log.name, log.log_level);
    }

    println!("{}", heading("Certificates", ctx.no_color));
    let now = Utc::now().timestamp();
    for cert in &snapshot.ssl_certificates {
        let status = if cert.validity.is_expired_at(now) { "expired" } else { "valid" };
        println!(
            "  {} {} ({status}, {})",
            cert.file_name,
            cert.subject.common_name.join(","),
            cert.signature_algorithm
        );
    }

    println!("{}", heading("Archives", ctx.no_color));
    println!(
        "  config    {} bytes  sha256 {}",
        snapshot.zconfig.contents.len(),
        snapshot.zconfig.checksum
    );
    match &snapshot.zaux {
        Some(z) => println!(
            "  auxiliary {} bytes  sha256 {}",
            z.contents.len(),
            z.checksum
        ),
        None => println!("  auxiliary (none)"),
    }
}
