use console::style;
use geoharvest_core::HarvestError;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for a missing endpoint URL
pub fn url_missing() -> CliError {
    CliError::new("No endpoint URL configured")
        .with_context("GeoHarvest needs a URL to fetch the FeatureCollection from.")
        .with_suggestion("Pass it directly: geoharvest run --url https://example.com/features")
        .with_suggestion("Or set GEOHARVEST_URL in the environment")
        .with_suggestion("Or add `url = \"...\"` to the file given with --config")
        .with_help("Run: geoharvest run --help")
}

/// Create error for an invalid configuration value
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check the values passed on the command line and in the config file")
        .with_suggestion("Inspect resolved values: geoharvest config")
        .with_help("Run: geoharvest config --help")
}

/// Create error for a fetch that failed on every attempt
pub fn fetch_failed(error: &HarvestError, attempts: u32) -> CliError {
    CliError::new("Failed to fetch the feature collection")
        .with_context(format!("All {} attempt(s) failed.\n\nLast error: {}", attempts, error))
        .with_suggestion("Check that the endpoint is reachable and the URL is correct")
        .with_suggestion("Increase --timeout or --retries for slow endpoints")
        .with_help("Run with RUST_LOG=debug for per-attempt details")
}

/// Create error for a response that is not a FeatureCollection
pub fn invalid_payload(error: &HarvestError) -> CliError {
    CliError::new("Endpoint did not return a GeoJSON FeatureCollection")
        .with_context(format!("Nothing was submitted.\n\nError: {}", error))
        .with_suggestion("Check the query parameters select GeoJSON output (e.g. outputFormat=application/json)")
        .with_suggestion("Fetch the URL manually to inspect the response")
}

/// Map a core error to a user-facing error
pub fn from_harvest_error(error: &HarvestError, attempts: u32) -> CliError {
    match error {
        HarvestError::ConfigMissing { key } if key == "url" => url_missing(),
        HarvestError::ConfigMissing { key } => invalid_config(key, "value is required"),
        HarvestError::ConfigInvalid { key, reason } => invalid_config(key, reason),
        HarvestError::Network { .. } | HarvestError::Timeout { .. } | HarvestError::Http { .. } => {
            fetch_failed(error, attempts)
        }
        HarvestError::Client { reason } => CliError::new("Failed to set up the HTTP client")
            .with_context(format!("No request was sent.\n\nReason: {}", reason))
            .with_help("Run with RUST_LOG=debug for details"),
        HarvestError::JsonParse(_) | HarvestError::Schema { .. } => invalid_payload(error),
        HarvestError::Sink { .. } | HarvestError::Io(_) | HarvestError::Serialization(_) => {
            CliError::new("Failed to write the feature collection")
                .with_context(format!("Error: {}", error))
                .with_suggestion("Check the output path exists and is writable")
        }
    }
}
