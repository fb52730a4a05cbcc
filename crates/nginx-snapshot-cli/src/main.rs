//! ngx-snapshot - NGINX configuration snapshots from the command line.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    nginx_snapshot_cli::run().await
}
