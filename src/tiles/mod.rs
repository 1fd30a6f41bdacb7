//! Raster tile plumbing: which tiles are visible, where they come from, and
//! how they are fetched.

pub mod cache;
pub mod grid;
pub mod loader;
pub mod source;

// Re-exports for convenience
pub use cache::TileCache;
pub use grid::{resolve_tiles, TileGrid};
pub use loader::{HttpTileFetcher, TileFetcher, TileLoadResult, TileLoader, TileRequest};
pub use source::{MirrorPolicy, TemplateTileSource, TileSource};
