use serde::Serialize;
use std::fmt;

/// Why a geometry (or one member/part of it) produced no output feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningKind {
    /// Type outside Point/LineString/Polygon and their multi/collection forms
    UnsupportedGeometry { type_name: String },
    /// A `GeometryCollection` inside a `GeometryCollection`
    NestedCollection,
    /// Coordinates do not match the nesting of the declared type
    MalformedCoordinates { type_name: String },
    /// Declared type carries no `coordinates` member
    MissingCoordinates { type_name: String },
    /// A `GeometryCollection` without a `geometries` array
    MissingMembers,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::UnsupportedGeometry { type_name } => {
                write!(f, "unsupported geometry type '{}'", type_name)
            }
            WarningKind::NestedCollection => {
                write!(f, "nested GeometryCollection is not expanded")
            }
            WarningKind::MalformedCoordinates { type_name } => {
                write!(f, "coordinates do not form a valid {}", type_name)
            }
            WarningKind::MissingCoordinates { type_name } => {
                write!(f, "{} has no coordinates", type_name)
            }
            WarningKind::MissingMembers => {
                write!(f, "GeometryCollection has no geometries array")
            }
        }
    }
}

/// A skipped geometry, located by source feature and member/part index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizationWarning {
    /// Position of the source feature in the payload's `features` array
    pub feature_index: usize,
    pub base_id: String,
    /// Member or part index for collections and multi-part geometries
    pub part_index: Option<usize>,
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.part_index {
            Some(part) => write!(
                f,
                "feature #{} ({}) part {}: {}",
                self.feature_index, self.base_id, part, self.kind
            ),
            None => write!(f, "feature #{} ({}): {}", self.feature_index, self.base_id, self.kind),
        }
    }
}

/// Counts reported once a run has produced its collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub source_features: usize,
    pub dropped_without_geometry: usize,
    pub emitted_features: usize,
    pub warnings: Vec<NormalizationWarning>,
}

impl RunSummary {
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}
