use geoharvest_core::models::{NormalizationWarning, RunSummary};
use serde::Serialize;

/// Output for run command
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub url: String,
    pub destination: String,
    pub source_features: usize,
    pub dropped_without_geometry: usize,
    pub emitted_features: usize,
    pub warnings: Vec<NormalizationWarning>,
}

impl RunOutput {
    pub fn new(url: String, destination: String, summary: RunSummary) -> Self {
        Self {
            url,
            destination,
            source_features: summary.source_features,
            dropped_without_geometry: summary.dropped_without_geometry,
            emitted_features: summary.emitted_features,
            warnings: summary.warnings,
        }
    }
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub values: Vec<ConfigEntry>,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}
