//! `ngx-snapshot logs` - Show declared access and error logs.

use anyhow::Result;

use nginx_snapshot::error_and_access_logs;

use super::Context;
use crate::cli::args::ConfigPathArgs;
use crate::output::{heading, print_json, OutputFormat};

pub fn execute(ctx: &Context, args: &ConfigPathArgs) -> Result<()> {
    let (error_logs, access_logs) = error_and_access_logs(&args.nginx_conf)?;

    match ctx.output_format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "access_logs": access_logs,
            "error_logs": error_logs,
        }))?,
        OutputFormat::Pretty => {
            println!("{}", heading("Access logs", ctx.no_color));
            for log in &access_logs {
                println!("  {} {} readable={} {}", log.name, log.permissions, log.readable, log.format);
            }
            println!("{}", heading("Error logs", ctx.no_color));
            for log in &error_logs {
                println!("  {} {} readable={} {}", log.name, log.permissions, log.readable, log.log_level);
            }
        }
    }
    Ok(())
}
