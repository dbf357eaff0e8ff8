//! Identity resolution for source and expanded features.
//!
//! Every source feature gets a base id: its own `id` when present, otherwise a BLAKE3 digest of
//! its content. Expanded features derive their ids from the base id plus an index suffix.

use crate::error::{HarvestError, Result};
use serde_json::{Map, Value};

/// Resolve the base id of a source feature.
///
/// With `remove_id`, the feature's `id` member is deleted first, so the content hash never sees it.
/// A `null` or empty-string id counts as absent.
pub fn resolve_base_id(feature: &mut Map<String, Value>, remove_id: bool) -> Result<String> {
    if remove_id {
        feature.remove("id");
    }

    match feature.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Null) | Some(Value::String(_)) | None => content_hash(feature),
        Some(other) => Ok(other.to_string()),
    }
}

/// Deterministic content hash of a feature object (lowercase hex BLAKE3).
///
/// The digest covers the compact `serde_json` serialization. `Map` is a `BTreeMap` unless
/// `preserve_order` is enabled, so keys are hashed in sorted order.
pub fn content_hash(feature: &Map<String, Value>) -> Result<String> {
    let mut hasher = blake3::Hasher::new();
    serde_json::to_writer(&mut hasher, feature)
        .map_err(|e| HarvestError::Serialization(format!("Failed to hash feature: {}", e)))?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Id of the `index`-th member of a `GeometryCollection`
pub fn collection_member_id(base_id: &str, index: usize) -> String {
    format!("{}-gc-{}", base_id, index)
}

/// Id of the `index`-th part of a multi-part geometry
pub fn part_id(base_id: &str, index: usize) -> String {
    format!("{}-{}", base_id, index)
}
