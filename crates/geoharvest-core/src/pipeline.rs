//! Pipeline orchestration: fetch, validate, normalize, submit.

use crate::config::HarvestConfig;
use crate::error::{HarvestError, Result};
use crate::fetch::{FetchRequest, Fetcher, ReqwestTransport, RetryPolicy};
use crate::identity::resolve_base_id;
use crate::models::{
    NormalizationWarning, NormalizedFeature, OutputFeatureCollection, RunSummary, SourceGeometry,
};
use crate::normalize::{expand, ExpandedGeometry};
use crate::ports::{FeatureSink, Transport};
use serde_json::{Map, Value};

/// A finished collection together with its run summary
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub collection: OutputFeatureCollection,
    pub summary: RunSummary,
}

/// Harvest pipeline orchestrating fetch, normalization and submission
pub struct Pipeline<T, S>
where
    T: Transport,
    S: FeatureSink,
{
    config: HarvestConfig,
    fetcher: Fetcher<T>,
    sink: S,
}

impl<S: FeatureSink> Pipeline<ReqwestTransport, S> {
    /// Create a pipeline that fetches over HTTP with the configured retry policy
    pub fn with_reqwest(config: HarvestConfig, sink: S) -> Result<Self> {
        let fetcher = Fetcher::with_reqwest(RetryPolicy::from_config(&config))?;
        Ok(Self::new(config, fetcher, sink))
    }
}

impl<T, S> Pipeline<T, S>
where
    T: Transport,
    S: FeatureSink,
{
    /// Create a new harvest pipeline
    pub fn new(config: HarvestConfig, fetcher: Fetcher<T>, sink: S) -> Self {
        Self { config, fetcher, sink }
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Fetch and normalize without submitting
    pub async fn collect(&self) -> Result<Normalized> {
        let request = FetchRequest::from_config(&self.config);
        tracing::info!(
            url = %request.url,
            attempts = self.fetcher.policy().attempts(),
            "Fetching feature collection"
        );

        let body = self.fetcher.fetch(&request).await?;
        normalize_payload(&body, self.config.remove_id)
    }

    /// Execute one run; the sink sees either the whole collection or nothing
    pub async fn run(&self) -> Result<RunSummary> {
        let Normalized { collection, summary } = self.collect().await?;

        self.sink.submit(&collection).await?;

        tracing::info!(
            source_features = summary.source_features,
            dropped = summary.dropped_without_geometry,
            emitted = summary.emitted_features,
            warnings = summary.warning_count(),
            "Submitted feature collection"
        );

        Ok(summary)
    }
}

/// Parse a response body and normalize it
pub fn normalize_payload(body: &str, remove_id: bool) -> Result<Normalized> {
    let payload: Value = serde_json::from_str(body)?;
    normalize_collection(payload, remove_id)
}

/// Normalize an already parsed `FeatureCollection`
pub fn normalize_collection(payload: Value, remove_id: bool) -> Result<Normalized> {
    let features = validate_collection(payload)?;

    let mut collection = OutputFeatureCollection::new();
    let mut summary = RunSummary { source_features: features.len(), ..Default::default() };

    for (feature_index, feature) in features.into_iter().enumerate() {
        let Value::Object(mut feature) = feature else {
            return Err(HarvestError::Schema {
                reason: format!("feature #{} is not a JSON object", feature_index),
            });
        };

        let geometry = match feature.get("geometry") {
            Some(geometry) if !geometry.is_null() => SourceGeometry::from_json(geometry),
            _ => {
                tracing::debug!(feature_index, "Dropping feature without geometry");
                summary.dropped_without_geometry += 1;
                continue;
            }
        };

        // Hash before properties are moved out of the feature
        let base_id = resolve_base_id(&mut feature, remove_id)?;
        let metadata = take_properties(&mut feature);

        let expansion = expand(&geometry, &base_id);

        for skipped in expansion.skipped {
            let warning = NormalizationWarning {
                feature_index,
                base_id: base_id.clone(),
                part_index: skipped.part_index,
                kind: skipped.kind,
            };
            tracing::warn!(
                feature_index,
                base_id = %base_id,
                part_index = ?warning.part_index,
                "Skipping geometry: {}",
                warning.kind
            );
            summary.warnings.push(warning);
        }

        for ExpandedGeometry { id, geometry } in expansion.geometries {
            collection.push(NormalizedFeature::new(id, geometry, metadata.clone()));
        }
    }

    summary.emitted_features = collection.len();
    Ok(Normalized { collection, summary })
}

fn validate_collection(payload: Value) -> Result<Vec<Value>> {
    let Value::Object(mut root) = payload else {
        return Err(HarvestError::Schema {
            reason: "top-level JSON value is not an object".to_string(),
        });
    };

    match root.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        Some(other) => {
            return Err(HarvestError::Schema {
                reason: format!("expected type 'FeatureCollection', found '{}'", other),
            })
        }
        None => {
            return Err(HarvestError::Schema {
                reason: "expected type 'FeatureCollection', found no type".to_string(),
            })
        }
    }

    match root.remove("features") {
        Some(Value::Array(features)) => Ok(features),
        _ => Err(HarvestError::Schema {
            reason: "'features' is missing or not an array".to_string(),
        }),
    }
}

fn take_properties(feature: &mut Map<String, Value>) -> Value {
    match feature.remove("properties") {
        Some(Value::Null) | None => Value::Object(Map::new()),
        Some(properties) => properties,
    }
}
