//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let settings = crate::config::load(cli.config.as_deref())?;

    let ctx = commands::Context {
        settings,
        output_format: cli.output.unwrap_or(OutputFormat::Pretty),
        no_color: cli.no_color,
    };

    match cli.command {
        Commands::Snapshot(args) => commands::snapshot::execute(&ctx, args),
        Commands::Unpack(args) => commands::unpack::execute(&ctx, &args),
        Commands::Probe(args) => commands::probe::execute(&ctx, args).await,
        Commands::Logs(args) => commands::logs::execute(&ctx, &args),
        Commands::Waf(args) => commands::waf::execute(&ctx, &args),
    }
}
