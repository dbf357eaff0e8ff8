use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// GeoHarvest - Remote GeoJSON harvesting and geometry normalization
#[derive(Parser, Debug)]
#[command(name = "geoharvest")]
#[command(about = "Fetch a remote FeatureCollection and flatten it into simple features", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Fetch and normalize, but do not write the collection
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, normalize and submit a feature collection
    Run(RunArgs),

    /// Show resolved configuration values and where they came from
    Config(ConfigArgs),
}

/// Options shared by every command that resolves configuration
#[derive(Parser, Debug, Clone, Default)]
pub struct ConfigLayerArgs {
    /// TOML configuration file
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Endpoint URL for the GET request
    #[arg(long)]
    pub url: Option<String>,

    /// Query parameter appended to the URL, in order (repeatable)
    #[arg(long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,

    /// Request header (repeatable)
    #[arg(long = "header", value_name = "KEY=VALUE")]
    pub header: Vec<String>,

    /// Ignore source feature ids and identify features by content hash (`--remove-id=false` to
    /// override a file or environment setting)
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub remove_id: Option<bool>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Additional attempts after the first failure
    #[arg(long)]
    pub retries: Option<u32>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub layers: ConfigLayerArgs,

    /// Write the collection to this file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub layers: ConfigLayerArgs,
}
