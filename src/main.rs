//! CLI entry point for bibfetch.

use std::process::ExitCode;

use anyhow::Result;
use tracing::{debug, info};

mod app_config;
mod cli;
mod runtime;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let (args, sources) = cli::parse_cli_with_sources();
    let loaded = app_config::load_config(args.config.as_deref())?;

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info
    let default_level = runtime::resolve_default_log_level(&args, loaded.config.as_ref());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, ?sources, "CLI arguments parsed");
    match (&loaded.path, loaded.config.is_some()) {
        (Some(path), true) => info!(path = %path.display(), "loaded config file"),
        (Some(path), false) => debug!(path = %path.display(), "no config file found"),
        (None, _) => debug!("no config path available"),
    }

    let resolved = runtime::resolve_config(&args, &sources, loaded.config.as_ref())?;
    resolved.log();

    let exit = runtime::run(&resolved).await?;
    if let runtime::ProcessExit::Completed(report) = &exit {
        debug!(processed = report.reconciliation.total(), "run finished");
    }
    Ok(exit.exit_code())
}
