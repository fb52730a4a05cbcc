//! `ngx-snapshot waf` - Show App Protect files of a saved snapshot.

use anyhow::Result;

use nginx_snapshot::app_protect_files;

use super::{read_snapshot, Context};
use crate::cli::args::SnapshotFileArgs;
use crate::output::{heading, print_json, OutputFormat};

pub fn execute(ctx: &Context, args: &SnapshotFileArgs) -> Result<()> {
    let snapshot = read_snapshot(&args.snapshot)?;
    let (policies, profiles) = app_protect_files(&snapshot)?;

    match ctx.output_format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "policies": policies,
            "profiles": profiles,
        }))?,
        OutputFormat::Pretty => {
            println!("{}", heading("Policies", ctx.no_color));
            for name in &policies {
                println!("  {name}");
            }
            println!("{}", heading("Log profiles", ctx.no_color));
            for name in &profiles {
                println!("  {name}");
            }
        }
    }
    Ok(())
}
