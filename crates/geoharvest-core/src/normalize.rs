//! Geometry normalization.
//!
//! Expands one classified source geometry into zero or more simple geometries with their
//! derived ids. Skipped members and parts are reported back as warnings; nothing here fails.

use crate::identity::{collection_member_id, part_id};
use crate::models::{CollectionMember, SimpleKind, SourceGeometry, WarningKind};
use serde_json::Value;

/// A simple geometry produced by expansion, paired with its derived id
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedGeometry {
    pub id: String,
    pub geometry: geojson::Geometry,
}

/// A geometry (or member/part) that produced no output
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedGeometry {
    pub part_index: Option<usize>,
    pub kind: WarningKind,
}

/// Result of expanding one source geometry, both lists in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub geometries: Vec<ExpandedGeometry>,
    pub skipped: Vec<SkippedGeometry>,
}

impl Expansion {
    fn emit(&mut self, id: String, geometry: geojson::Geometry) {
        self.geometries.push(ExpandedGeometry { id, geometry });
    }

    fn skip(&mut self, part_index: Option<usize>, kind: WarningKind) {
        self.skipped.push(SkippedGeometry { part_index, kind });
    }
}

/// Build a simple geometry from a type name and raw coordinates.
///
/// Only `Point`, `LineString` and `Polygon` are accepted.
pub fn create_simple(type_name: &str, coordinates: &Value) -> Result<geojson::Geometry, WarningKind> {
    let kind = SimpleKind::parse(type_name).ok_or_else(|| WarningKind::UnsupportedGeometry {
        type_name: type_name.to_string(),
    })?;
    build_simple(kind, coordinates)
}

fn build_simple(kind: SimpleKind, coordinates: &Value) -> Result<geojson::Geometry, WarningKind> {
    let malformed = || WarningKind::MalformedCoordinates { type_name: kind.as_str().to_string() };

    let value = match kind {
        SimpleKind::Point => serde_json::from_value::<geojson::PointType>(coordinates.clone())
            .ok()
            .filter(|position| is_position(position))
            .map(geojson::Value::Point),
        SimpleKind::LineString => serde_json::from_value::<geojson::LineStringType>(coordinates.clone())
            .ok()
            .filter(|line| is_line(line))
            .map(geojson::Value::LineString),
        SimpleKind::Polygon => serde_json::from_value::<geojson::PolygonType>(coordinates.clone())
            .ok()
            .filter(|rings| !rings.is_empty() && rings.iter().all(|ring| is_ring(ring)))
            .map(geojson::Value::Polygon),
    }
    .ok_or_else(malformed)?;

    Ok(geojson::Geometry::new(value))
}

fn is_position(position: &[f64]) -> bool {
    position.len() >= 2
}

fn is_line(line: &[geojson::PointType]) -> bool {
    line.len() >= 2 && line.iter().all(|position| is_position(position))
}

// A linear ring is closed, so it needs at least four positions.
fn is_ring(ring: &[geojson::PointType]) -> bool {
    ring.len() >= 4 && ring.iter().all(|position| is_position(position))
}

/// Expand a source geometry into simple geometries, deriving ids from `base_id`
pub fn expand(geometry: &SourceGeometry, base_id: &str) -> Expansion {
    let mut expansion = Expansion::default();

    match geometry {
        SourceGeometry::Collection { members: Some(members) } => {
            expand_collection(members, base_id, &mut expansion)
        }
        SourceGeometry::Collection { members: None } => {
            expansion.skip(None, WarningKind::MissingMembers)
        }
        SourceGeometry::Multi { kind, coordinates } => {
            expand_multi(*kind, coordinates.as_ref(), base_id, &mut expansion)
        }
        SourceGeometry::Simple { kind, coordinates } => match coordinates {
            Some(coordinates) => match build_simple(*kind, coordinates) {
                Ok(simple) => expansion.emit(base_id.to_string(), simple),
                Err(kind) => expansion.skip(None, kind),
            },
            None => expansion.skip(
                None,
                WarningKind::MissingCoordinates { type_name: kind.as_str().to_string() },
            ),
        },
        SourceGeometry::Unsupported { type_name } => expansion.skip(
            None,
            WarningKind::UnsupportedGeometry { type_name: type_name.clone() },
        ),
    }

    expansion
}

// Indices count every member, so skipped members leave gaps in the id sequence.
fn expand_collection(members: &[CollectionMember], base_id: &str, expansion: &mut Expansion) {
    for (index, member) in members.iter().enumerate() {
        if member.type_name == "GeometryCollection" {
            expansion.skip(Some(index), WarningKind::NestedCollection);
            continue;
        }

        let result = match &member.coordinates {
            Some(coordinates) => create_simple(&member.type_name, coordinates),
            None if SimpleKind::parse(&member.type_name).is_some() => {
                Err(WarningKind::MissingCoordinates { type_name: member.type_name.clone() })
            }
            None => Err(WarningKind::UnsupportedGeometry { type_name: member.type_name.clone() }),
        };

        match result {
            Ok(simple) => expansion.emit(collection_member_id(base_id, index), simple),
            Err(kind) => expansion.skip(Some(index), kind),
        }
    }
}

fn expand_multi(kind: SimpleKind, coordinates: Option<&Value>, base_id: &str, expansion: &mut Expansion) {
    let multi_name = format!("Multi{}", kind);

    let parts = match coordinates {
        Some(Value::Array(parts)) => parts,
        Some(_) => {
            expansion.skip(None, WarningKind::MalformedCoordinates { type_name: multi_name });
            return;
        }
        None => {
            expansion.skip(None, WarningKind::MissingCoordinates { type_name: multi_name });
            return;
        }
    };

    for (index, part) in parts.iter().enumerate() {
        match build_simple(kind, part) {
            Ok(simple) => expansion.emit(part_id(base_id, index), simple),
            Err(warning) => expansion.skip(Some(index), warning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(value: Value) -> SourceGeometry {
        SourceGeometry::from_json(&value)
    }

    fn ids(expansion: &Expansion) -> Vec<&str> {
        expansion.geometries.iter().map(|g| g.id.as_str()).collect()
    }

    #[test]
    fn test_create_simple_accepts_supported_types() {
        let point = create_simple("Point", &json!([1.0, 2.0])).unwrap();
        assert_eq!(point.value, geojson::Value::Point(vec![1.0, 2.0]));

        let line = create_simple("LineString", &json!([[0, 0], [1, 1]])).unwrap();
        assert_eq!(line.value, geojson::Value::LineString(vec![vec![0.0, 0.0], vec![1.0, 1.0]]));

        let polygon = create_simple("Polygon", &json!([[[0, 0], [1, 0], [1, 1], [0, 0]]])).unwrap();
        assert!(matches!(polygon.value, geojson::Value::Polygon(_)));
    }

    #[test]
    fn test_create_simple_rejects_other_types() {
        assert_eq!(
            create_simple("Circle", &json!([0, 0])),
            Err(WarningKind::UnsupportedGeometry { type_name: "Circle".to_string() })
        );
        assert!(create_simple("MultiPoint", &json!([[0, 0]])).is_err());
    }

    #[test]
    fn test_create_simple_rejects_mismatched_nesting() {
        assert_eq!(
            create_simple("Point", &json!([[0, 0], [1, 1]])),
            Err(WarningKind::MalformedCoordinates { type_name: "Point".to_string() })
        );
    }

    #[test]
    fn test_simple_geometry_keeps_base_id() {
        let expansion = expand(&classify(json!({"type": "Point", "coordinates": [3.0, 4.0]})), "b");
        assert_eq!(ids(&expansion), vec!["b"]);
        assert_eq!(expansion.geometries[0].geometry.value, geojson::Value::Point(vec![3.0, 4.0]));
        assert!(expansion.skipped.is_empty());
    }

    #[test]
    fn test_simple_geometry_without_coordinates() {
        let expansion = expand(&classify(json!({"type": "LineString"})), "b");
        assert!(expansion.geometries.is_empty());
        assert_eq!(
            expansion.skipped[0].kind,
            WarningKind::MissingCoordinates { type_name: "LineString".to_string() }
        );
    }

    #[test]
    fn test_multi_part_expands_each_part() {
        let expansion = expand(
            &classify(json!({
                "type": "MultiLineString",
                "coordinates": [[[0, 0], [1, 1]], [[2, 2], [3, 3]], [[4, 4], [5, 5]]]
            })),
            "road",
        );

        assert_eq!(ids(&expansion), vec!["road-0", "road-1", "road-2"]);
        assert!(expansion
            .geometries
            .iter()
            .all(|g| matches!(g.geometry.value, geojson::Value::LineString(_))));
    }

    #[test]
    fn test_multi_part_skips_malformed_part() {
        let expansion = expand(
            &classify(json!({"type": "MultiPoint", "coordinates": [[0, 0], "oops", [2, 2]]})),
            "m",
        );

        assert_eq!(ids(&expansion), vec!["m-0", "m-2"]);
        assert_eq!(expansion.skipped.len(), 1);
        assert_eq!(expansion.skipped[0].part_index, Some(1));
    }

    #[test]
    fn test_multi_without_array_coordinates() {
        let missing = expand(&classify(json!({"type": "MultiPolygon"})), "m");
        assert_eq!(
            missing.skipped[0].kind,
            WarningKind::MissingCoordinates { type_name: "MultiPolygon".to_string() }
        );

        let scalar = expand(&classify(json!({"type": "MultiPoint", "coordinates": 5})), "m");
        assert!(scalar.geometries.is_empty());
        assert_eq!(
            scalar.skipped[0].kind,
            WarningKind::MalformedCoordinates { type_name: "MultiPoint".to_string() }
        );
    }

    #[test]
    fn test_collection_without_geometries_array() {
        for geometry in [
            json!({"type": "GeometryCollection"}),
            json!({"type": "GeometryCollection", "geometries": null}),
            json!({"type": "GeometryCollection", "geometries": {"type": "Point"}}),
        ] {
            let expansion = expand(&classify(geometry), "a");
            assert!(expansion.geometries.is_empty());
            assert_eq!(
                expansion.skipped,
                vec![SkippedGeometry { part_index: None, kind: WarningKind::MissingMembers }]
            );
        }
    }

    #[test]
    fn test_empty_collection_emits_nothing_silently() {
        let expansion = expand(&classify(json!({"type": "GeometryCollection", "geometries": []})), "a");
        assert!(expansion.geometries.is_empty());
        assert!(expansion.skipped.is_empty());
    }

    #[test]
    fn test_short_coordinates_are_malformed() {
        let malformed = |type_name: &str| -> Result<geojson::Geometry, WarningKind> {
            Err(WarningKind::MalformedCoordinates { type_name: type_name.to_string() })
        };

        assert_eq!(create_simple("Point", &json!([])), malformed("Point"));
        assert_eq!(create_simple("Point", &json!([1.0])), malformed("Point"));
        assert_eq!(create_simple("LineString", &json!([[0, 0]])), malformed("LineString"));
        assert_eq!(create_simple("LineString", &json!([[0, 0], []])), malformed("LineString"));
        assert_eq!(create_simple("Polygon", &json!([])), malformed("Polygon"));
        assert_eq!(create_simple("Polygon", &json!([[[0, 0], [1, 1], [0, 0]]])), malformed("Polygon"));
        assert!(create_simple("Point", &json!([1.0, 2.0, 3.0])).is_ok());
    }

    #[test]
    fn test_multi_point_with_empty_part() {
        let expansion = expand(&classify(json!({"type": "MultiPoint", "coordinates": [[], [1, 1]]})), "m");
        assert_eq!(ids(&expansion), vec!["m-1"]);
        assert_eq!(expansion.skipped[0].part_index, Some(0));
    }

    #[test]
    fn test_collection_uses_original_indices() {
        let expansion = expand(
            &classify(json!({
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Point", "coordinates": [0, 0]},
                    {"type": "Circle", "coordinates": [0, 0]},
                    {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}
                ]
            })),
            "gc",
        );

        assert_eq!(ids(&expansion), vec!["gc-gc-0", "gc-gc-2"]);
        assert_eq!(
            expansion.skipped,
            vec![SkippedGeometry {
                part_index: Some(1),
                kind: WarningKind::UnsupportedGeometry { type_name: "Circle".to_string() },
            }]
        );
    }

    #[test]
    fn test_nested_collection_is_not_expanded() {
        let expansion = expand(
            &classify(json!({
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "GeometryCollection", "geometries": [{"type": "Point", "coordinates": [0, 0]}]},
                    {"type": "Point", "coordinates": [1, 1]}
                ]
            })),
            "n",
        );

        assert_eq!(ids(&expansion), vec!["n-gc-1"]);
        assert_eq!(expansion.skipped[0].kind, WarningKind::NestedCollection);
    }

    #[test]
    fn test_collection_member_with_multi_type_is_unsupported() {
        let expansion = expand(
            &classify(json!({
                "type": "GeometryCollection",
                "geometries": [{"type": "MultiPoint", "coordinates": [[0, 0]]}]
            })),
            "c",
        );

        assert!(expansion.geometries.is_empty());
        assert_eq!(
            expansion.skipped[0].kind,
            WarningKind::UnsupportedGeometry { type_name: "MultiPoint".to_string() }
        );
    }

    #[test]
    fn test_unsupported_top_level_geometry() {
        let expansion = expand(&classify(json!({"type": "Circle", "coordinates": [0, 0]})), "x");
        assert!(expansion.geometries.is_empty());
        assert_eq!(expansion.skipped.len(), 1);
        assert_eq!(expansion.skipped[0].part_index, None);
    }
}
