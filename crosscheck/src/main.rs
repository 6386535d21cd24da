// crosscheck/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::run::RunOptions;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug crosscheck run ... to see every fetch. Logs go to stderr, reports to stdout.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        // --- USE CASE: CROSS-SYSTEM VALIDATION ---
        Commands::Run {
            project_dir,
            keys,
            limit,
            cdes,
            format,
            output,
            fail_on_violation,
        } => {
            commands::run::execute(RunOptions {
                project_dir,
                keys,
                limit,
                cdes,
                format,
                output,
                fail_on_violation,
            })
            .await
        }

        // --- USE CASE: RE-RENDER A SAVED RUN ---
        Commands::Report {
            input,
            format,
            output,
        } => commands::report::execute(&input, format, output.as_deref()),

        // --- USE CASE: CONNECTION TEST ---
        Commands::Ping { project_dir } => commands::ping::execute(&project_dir).await,

        // --- USE CASE: METADATA VIEWS ---
        Commands::Catalog { project_dir, view } => commands::catalog::execute(&project_dir, view),
    }
}
