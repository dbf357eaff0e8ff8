//! Output-side feature model handed to the downstream sink.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Literal `"Feature"` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureTag {
    #[default]
    Feature,
}

/// Literal `"FeatureCollection"` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollectionTag {
    #[default]
    FeatureCollection,
}

/// Properties of a normalized feature; the source properties are nested under `metadata`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureProperties {
    pub metadata: Value,
}

/// A feature whose geometry is always a `Point`, `LineString` or `Polygon`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFeature {
    pub id: String,
    #[serde(rename = "type")]
    pub tag: FeatureTag,
    pub properties: FeatureProperties,
    pub geometry: geojson::Geometry,
}

impl NormalizedFeature {
    pub fn new(id: impl Into<String>, geometry: geojson::Geometry, metadata: Value) -> Self {
        Self {
            id: id.into(),
            tag: FeatureTag::Feature,
            properties: FeatureProperties { metadata },
            geometry,
        }
    }

    /// GeoJSON type name of the geometry
    pub fn geometry_type(&self) -> &'static str {
        match self.geometry.value {
            geojson::Value::Point(_) => "Point",
            geojson::Value::LineString(_) => "LineString",
            geojson::Value::Polygon(_) => "Polygon",
            geojson::Value::MultiPoint(_) => "MultiPoint",
            geojson::Value::MultiLineString(_) => "MultiLineString",
            geojson::Value::MultiPolygon(_) => "MultiPolygon",
            geojson::Value::GeometryCollection(_) => "GeometryCollection",
        }
    }
}

/// Ordered collection submitted to the sink as a single unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputFeatureCollection {
    #[serde(rename = "type")]
    pub tag: CollectionTag,
    pub features: Vec<NormalizedFeature>,
}

impl OutputFeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: NormalizedFeature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Serialize as pretty-printed GeoJSON
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::HarvestError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_serialization_shape() {
        let feature = NormalizedFeature::new(
            "abc",
            geojson::Geometry::new(geojson::Value::Point(vec![115.0, -8.5])),
            json!({"name": "Ubud"}),
        );

        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["type"], "Feature");
        assert_eq!(value["properties"]["metadata"]["name"], "Ubud");
        assert_eq!(value["geometry"]["type"], "Point");
        assert_eq!(value["geometry"]["coordinates"], json!([115.0, -8.5]));
        assert_eq!(feature.geometry_type(), "Point");
    }

    #[test]
    fn test_collection_serialization_shape() {
        let mut collection = OutputFeatureCollection::new();
        assert!(collection.is_empty());

        collection.push(NormalizedFeature::new(
            "a",
            geojson::Geometry::new(geojson::Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]])),
            json!({}),
        ));

        let json = collection.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().unwrap().len(), 1);

        let parsed: OutputFeatureCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, collection);
    }
}
