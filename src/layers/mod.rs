pub mod raster;
pub mod vector;

pub use raster::{LoadOutcome, RasterLayer, ReconcileReport, TileImageHandle, TileStatus};
pub use vector::{VectorOverlay, VectorPath};
