pub mod geojson;
pub mod source;

pub use geojson::{parse_dataset, Dataset, GeoPoint, SkippedRecord};
pub use source::{DatasetSource, FileDatasetSource, HttpDatasetSource, StaticDatasetSource};
