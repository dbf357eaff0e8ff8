//! Command implementations

mod config;
mod run;

use crate::cli::{Cli, Commands, ConfigLayerArgs};
use crate::errors;
use crate::output::OutputWriter;
use anyhow::Result;
use geoharvest_core::config::{parse_key_value, CliConfigOverrides, KeyValue, LayeredConfig};
use geoharvest_core::HarvestError;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match cli.command {
        Commands::Run(args) => run::execute(args, &output, cli.dry_run).await,
        Commands::Config(args) => config::execute(args, &output),
    }
}

/// Build the layered configuration: defaults, file, environment, then CLI flags
pub(crate) fn load_layers(args: &ConfigLayerArgs) -> Result<LayeredConfig> {
    let mut layered = LayeredConfig::with_defaults();
    if let Some(path) = &args.config {
        layered = layered.load_from_file(path).map_err(|e| errors::from_harvest_error(&e, 0))?;
    }
    let mut layered = layered.load_from_env();
    let overrides = overrides(args).map_err(|e| errors::from_harvest_error(&e, 0))?;
    layered.update_from_cli(overrides);
    Ok(layered)
}

fn overrides(args: &ConfigLayerArgs) -> geoharvest_core::Result<CliConfigOverrides> {
    Ok(CliConfigOverrides {
        url: args.url.clone(),
        query_params: parse_pairs(&args.query)?,
        headers: parse_pairs(&args.header)?,
        remove_id: args.remove_id,
        timeout_ms: args.timeout,
        retries: args.retries,
    })
}

fn parse_pairs(raw: &[String]) -> geoharvest_core::Result<Option<Vec<KeyValue>>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let pairs = raw.iter().map(|s| parse_key_value(s)).collect::<Result<Vec<_>, HarvestError>>()?;
    Ok(Some(pairs))
}
