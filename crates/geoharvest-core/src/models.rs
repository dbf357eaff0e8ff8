pub mod feature;
pub mod report;
pub mod source;

pub use feature::{FeatureProperties, NormalizedFeature, OutputFeatureCollection};
pub use report::{NormalizationWarning, RunSummary, WarningKind};
pub use source::{CollectionMember, SimpleKind, SourceGeometry};
