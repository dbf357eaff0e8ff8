use crate::error::{HarvestError, Result};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RETRIES: u32 = 2;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// A `{ key, value }` pair used for query parameters and headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    #[serde(alias = "Key")]
    pub key: String,
    #[serde(alias = "Value")]
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Immutable configuration for one harvest run
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestConfig {
    pub url: Url,
    pub query_params: Vec<KeyValue>,
    pub headers: Vec<KeyValue>,
    pub remove_id: bool,
    pub timeout: Duration,
    pub retries: u32,
}

impl HarvestConfig {
    /// Configuration for `url` with every other option at its default
    pub fn for_url(url: &str) -> Result<Self> {
        Ok(Self {
            url: parse_url(url)?,
            query_params: Vec::new(),
            headers: Vec::new(),
            remove_id: false,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retries: DEFAULT_RETRIES,
        })
    }

    /// The base URL with the configured query parameters appended in list order
    pub fn request_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for param in &self.query_params {
                pairs.append_pair(&param.key, &param.value);
            }
        }
        url
    }
}

/// Layered configuration for GeoHarvest
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub url: ConfigValue<Option<String>>,
    pub query_params: ConfigValue<Vec<KeyValue>>,
    pub headers: ConfigValue<Vec<KeyValue>>,
    pub remove_id: ConfigValue<bool>,
    pub timeout_ms: ConfigValue<u64>,
    pub retries: ConfigValue<u32>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            url: ConfigValue::new(None, ConfigSource::Default),
            query_params: ConfigValue::new(Vec::new(), ConfigSource::Default),
            headers: ConfigValue::new(Vec::new(), ConfigSource::Default),
            remove_id: ConfigValue::new(false, ConfigSource::Default),
            timeout_ms: ConfigValue::new(DEFAULT_TIMEOUT_MS, ConfigSource::Default),
            retries: ConfigValue::new(DEFAULT_RETRIES, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| HarvestError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| HarvestError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(url) = file_config.url {
            self.url.update(Some(url), ConfigSource::File);
        }

        if let Some(query_params) = file_config.query_params {
            self.query_params.update(query_params, ConfigSource::File);
        }

        if let Some(headers) = file_config.headers {
            self.headers.update(headers, ConfigSource::File);
        }

        if let Some(remove_id) = file_config.remove_id {
            self.remove_id.update(remove_id, ConfigSource::File);
        }

        if let Some(timeout) = file_config.timeout {
            self.timeout_ms.update(timeout, ConfigSource::File);
        }

        if let Some(retries) = file_config.retries {
            self.retries.update(retries, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOHARVEST_URL
        if let Ok(url) = env::var("GEOHARVEST_URL") {
            self.url.update(Some(url), ConfigSource::Environment);
        }

        // GEOHARVEST_REMOVE_ID
        if let Ok(flag) = env::var("GEOHARVEST_REMOVE_ID") {
            match parse_bool(&flag) {
                Some(remove_id) => self.remove_id.update(remove_id, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid GEOHARVEST_REMOVE_ID value '{}': expected true or false",
                    flag
                ),
            }
        }

        // GEOHARVEST_TIMEOUT
        if let Ok(timeout_str) = env::var("GEOHARVEST_TIMEOUT") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => self.timeout_ms.update(timeout, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOHARVEST_TIMEOUT value '{}': expected milliseconds",
                    timeout_str
                ),
            }
        }

        // GEOHARVEST_RETRIES
        if let Ok(retries_str) = env::var("GEOHARVEST_RETRIES") {
            match retries_str.parse::<u32>() {
                Ok(retries) => self.retries.update(retries, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOHARVEST_RETRIES value '{}': expected a non-negative integer",
                    retries_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(url) = overrides.url {
            self.url.update(Some(url), ConfigSource::Cli);
        }

        if let Some(query_params) = overrides.query_params {
            self.query_params.update(query_params, ConfigSource::Cli);
        }

        if let Some(headers) = overrides.headers {
            self.headers.update(headers, ConfigSource::Cli);
        }

        if let Some(remove_id) = overrides.remove_id {
            self.remove_id.update(remove_id, ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.timeout_ms {
            self.timeout_ms.update(timeout, ConfigSource::Cli);
        }

        if let Some(retries) = overrides.retries {
            self.retries.update(retries, ConfigSource::Cli);
        }
    }

    /// Validate the layered values and freeze them into a [`HarvestConfig`]
    pub fn resolve(&self) -> Result<HarvestConfig> {
        let url = self
            .url
            .value
            .as_deref()
            .ok_or_else(|| HarvestError::ConfigMissing { key: "url".to_string() })?;

        if self.timeout_ms.value == 0 {
            return Err(HarvestError::ConfigInvalid {
                key: "timeout".to_string(),
                reason: "Timeout must be greater than zero".to_string(),
            });
        }

        for header in &self.headers.value {
            validate_header(header)?;
        }

        Ok(HarvestConfig {
            url: parse_url(url)?,
            query_params: self.query_params.value.clone(),
            headers: self.headers.value.clone(),
            remove_id: self.remove_id.value,
            timeout: Duration::from_millis(self.timeout_ms.value),
            retries: self.retries.value,
        })
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "url".to_string(),
            (self.url.value.clone().unwrap_or_else(|| "(not set)".to_string()), self.url.source),
        );

        map.insert(
            "query_params".to_string(),
            (format_pairs(&self.query_params.value), self.query_params.source),
        );

        // Header values may carry credentials
        let header_names: Vec<&str> = self.headers.value.iter().map(|h| h.key.as_str()).collect();
        map.insert("headers".to_string(), (header_names.join(", "), self.headers.source));

        map.insert(
            "remove_id".to_string(),
            (self.remove_id.value.to_string(), self.remove_id.source),
        );

        map.insert(
            "timeout".to_string(),
            (format!("{}ms", self.timeout_ms.value), self.timeout_ms.source),
        );

        map.insert("retries".to_string(), (self.retries.value.to_string(), self.retries.source));

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    #[serde(alias = "URL")]
    url: Option<String>,
    #[serde(alias = "QueryParams")]
    query_params: Option<Vec<KeyValue>>,
    #[serde(alias = "Headers")]
    headers: Option<Vec<KeyValue>>,
    #[serde(alias = "RemoveID")]
    remove_id: Option<bool>,
    #[serde(alias = "Timeout")]
    timeout: Option<u64>,
    #[serde(alias = "Retries")]
    retries: Option<u32>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub url: Option<String>,
    pub query_params: Option<Vec<KeyValue>>,
    pub headers: Option<Vec<KeyValue>>,
    pub remove_id: Option<bool>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
}

/// Parse a `KEY=VALUE` pair; the value may itself contain `=`
pub fn parse_key_value(s: &str) -> Result<KeyValue> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok(KeyValue::new(key.trim(), value)),
        _ => Err(HarvestError::ConfigInvalid {
            key: "key_value".to_string(),
            reason: format!("Invalid pair '{}'. Use KEY=VALUE", s),
        }),
    }
}

/// Parse an absolute http(s) URL
pub fn parse_url(s: &str) -> Result<Url> {
    let url = Url::parse(s).map_err(|e| HarvestError::ConfigInvalid {
        key: "url".to_string(),
        reason: format!("Invalid URL '{}': {}", s, e),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(HarvestError::ConfigInvalid {
            key: "url".to_string(),
            reason: format!("Unsupported URL scheme '{}'. Use http or https", scheme),
        }),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn validate_header(header: &KeyValue) -> Result<()> {
    HeaderName::from_bytes(header.key.as_bytes()).map_err(|e| HarvestError::ConfigInvalid {
        key: "headers".to_string(),
        reason: format!("Invalid header name '{}': {}", header.key, e),
    })?;
    HeaderValue::from_str(&header.value).map_err(|e| HarvestError::ConfigInvalid {
        key: "headers".to_string(),
        reason: format!("Invalid value for header '{}': {}", header.key, e),
    })?;
    Ok(())
}

fn format_pairs(pairs: &[KeyValue]) -> String {
    pairs.iter().map(|p| format!("{}={}", p.key, p.value)).collect::<Vec<_>>().join("&")
}
