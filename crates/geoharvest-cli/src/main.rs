//! GeoHarvest CLI - Command-line interface
//!
//! Wires layered configuration, logging and output sinks around the core harvest pipeline.

mod cli;
mod commands;
mod dry_run;
mod errors;
mod output;
mod output_types;
mod sink;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Initialize tracing on stderr; stdout may carry the collection
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Create async runtime
    let runtime = tokio::runtime::Runtime::new()?;

    // Execute the command
    if let Err(error) = runtime.block_on(async { commands::execute(cli).await }) {
        match error.downcast_ref::<errors::CliError>() {
            Some(cli_error) => {
                cli_error.display();
                std::process::exit(1);
            }
            None => return Err(error),
        }
    }

    Ok(())
}
