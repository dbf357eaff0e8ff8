//! Source-side geometry model.
//!
//! Remote payloads are untyped JSON. Each feature's `geometry` member is classified once into
//! [`SourceGeometry`] so the normalizer can match on it exhaustively.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The three geometry kinds that survive normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimpleKind {
    Point,
    LineString,
    Polygon,
}

impl SimpleKind {
    /// Parse a GeoJSON type name (`"Point"`, `"LineString"`, `"Polygon"`)
    pub fn parse(type_name: &str) -> Option<Self> {
        match type_name {
            "Point" => Some(SimpleKind::Point),
            "LineString" => Some(SimpleKind::LineString),
            "Polygon" => Some(SimpleKind::Polygon),
            _ => None,
        }
    }

    /// Parse a multi-part type name by stripping the `Multi` prefix
    pub fn from_multi(type_name: &str) -> Option<Self> {
        type_name.strip_prefix("Multi").and_then(Self::parse)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SimpleKind::Point => "Point",
            SimpleKind::LineString => "LineString",
            SimpleKind::Polygon => "Polygon",
        }
    }
}

impl fmt::Display for SimpleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a `GeometryCollection`, kept raw until it is expanded
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMember {
    pub type_name: String,
    pub coordinates: Option<Value>,
}

/// Classified source geometry
#[derive(Debug, Clone, PartialEq)]
pub enum SourceGeometry {
    /// `Point`, `LineString` or `Polygon`
    Simple {
        kind: SimpleKind,
        coordinates: Option<Value>,
    },
    /// `MultiPoint`, `MultiLineString` or `MultiPolygon`; `kind` is the per-part type
    Multi {
        kind: SimpleKind,
        coordinates: Option<Value>,
    },
    /// `GeometryCollection` with its members in source order; `None` when `geometries` is
    /// missing or not an array
    Collection { members: Option<Vec<CollectionMember>> },
    /// Anything else (`Circle`, vendor extensions, missing `type`)
    Unsupported { type_name: String },
}

impl SourceGeometry {
    /// Classify a GeoJSON geometry object
    pub fn from_json(value: &Value) -> Self {
        let type_name = type_name_of(value);

        if let Some(kind) = SimpleKind::parse(&type_name) {
            return SourceGeometry::Simple { kind, coordinates: value.get("coordinates").cloned() };
        }

        if let Some(kind) = SimpleKind::from_multi(&type_name) {
            return SourceGeometry::Multi { kind, coordinates: value.get("coordinates").cloned() };
        }

        if type_name == "GeometryCollection" {
            let members = value
                .get("geometries")
                .and_then(Value::as_array)
                .map(|geometries| {
                    geometries
                        .iter()
                        .map(|member| CollectionMember {
                            type_name: type_name_of(member),
                            coordinates: member.get("coordinates").cloned(),
                        })
                        .collect()
                });
            return SourceGeometry::Collection { members };
        }

        SourceGeometry::Unsupported { type_name }
    }

    /// The source type name, as it would appear in the payload
    pub fn type_name(&self) -> String {
        match self {
            SourceGeometry::Simple { kind, .. } => kind.as_str().to_string(),
            SourceGeometry::Multi { kind, .. } => format!("Multi{}", kind),
            SourceGeometry::Collection { .. } => "GeometryCollection".to_string(),
            SourceGeometry::Unsupported { type_name } => type_name.clone(),
        }
    }
}

fn type_name_of(value: &Value) -> String {
    value.get("type").and_then(Value::as_str).unwrap_or_default().to_string()
}
