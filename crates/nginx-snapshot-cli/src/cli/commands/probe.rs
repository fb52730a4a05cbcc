//! `ngx-snapshot probe` - Find a reachable status endpoint.

use anyhow::Result;
use std::time::Duration;

use nginx_snapshot::{status_api_info, EndpointKind};

use super::Context;
use crate::cli::args::ProbeArgs;
use crate::output::{print_json, OutputFormat};

pub async fn execute(ctx: &Context, args: ProbeArgs) -> Result<()> {
    let timeout = args
        .timeout
        .map_or_else(|| ctx.settings.probe_timeout(), Duration::from_secs);

    let endpoint = status_api_info(&args.target.nginx_conf, timeout).await?;

    match ctx.output_format {
        OutputFormat::Json => print_json(&endpoint)?,
        OutputFormat::Pretty => {
            let kind = match endpoint.kind {
                EndpointKind::Plus => "NGINX Plus API",
                EndpointKind::Oss => "stub_status",
            };
            println!("{} ({kind})", endpoint.url);
        }
    }
    Ok(())
}
