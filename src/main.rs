mod cli;
mod commands;
mod identifiers;
mod metrics;
mod model;
mod ordering;
mod profile;
mod render;
mod table;
mod util;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

const DEFAULT_LOG_FILTER: &str = "info";

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let command = cli.command.name();
    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(command, error = %err, "runcharts failed");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            ExitCode::FAILURE
        }
    }
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Profiles(args) => commands::profiles::run(args),
    }
}

/// Logs go to stderr so `inspect` and `profiles --json` keep stdout clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
