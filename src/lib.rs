//! # quakemap
//!
//! An interactive earthquake map: a tiled raster basemap with a vector
//! overlay of weighted points, kept in sync with a continuous pan/zoom
//! transform.
//!
//! The crate is organised the way a small map engine usually is:
//! projection and view math in [`core`], tile resolution and retrieval in
//! [`tiles`], the two drawable layers in [`layers`], dataset loading in
//! [`data`], gesture handling and the repaint pipeline in [`input`], and the
//! rendering collaborator in [`rendering`].

pub mod core;
pub mod data;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod rendering;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::MapConfig,
    geo::{LngLat, Point, TileIndex, ViewportSize},
    projection::MercatorProjection,
    transform::{LayerTransform, ScaleExtent, ViewTransform},
};

pub use data::{geojson::GeoPoint, source::DatasetSource};

pub use input::{controller::InteractionController, events::GestureEvent, zoom::ZoomBehavior};

pub use layers::{raster::RasterLayer, vector::VectorOverlay};

pub use rendering::{scene::SceneGraph, surface::RenderSurface};

pub use tiles::{grid::resolve_tiles, loader::TileLoader, source::TileSource};

/// Installs the `env_logger` backend, configured through `RUST_LOG`.
/// Calling it more than once is harmless.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The point dataset could not be fetched or is not a usable feature
    /// collection. Fatal to the whole view.
    #[error("failed to load dataset from {source_name}: {reason}")]
    DatasetLoad { source_name: String, reason: String },

    /// A single raster tile could not be retrieved. Recovered by the raster
    /// layer, which leaves the cell blank.
    #[error("failed to load tile {tile}: {reason}")]
    TileLoad { tile: TileIndex, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client setup failed. Failures of individual tile requests are
    /// reported as [`MapError::TileLoad`] instead.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MapError {
    pub fn dataset(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::DatasetLoad {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn tile(tile: TileIndex, reason: impl ToString) -> Self {
        Self::TileLoad {
            tile,
            reason: reason.to_string(),
        }
    }

    /// Whether the error must halt initialization. Only tile failures are
    /// handled locally, by the raster layer.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::TileLoad { .. })
    }
}

/// Error type alias for convenience
pub type Error = MapError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_tile_errors_are_recoverable() {
        assert!(!MapError::tile(TileIndex::new(5, 9, 14), "HTTP 404").is_fatal());
        assert!(MapError::dataset("quakes.geojson", "not found").is_fatal());
        assert!(MapError::InvalidConfig("no mirrors".to_string()).is_fatal());
        assert!(MapError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk")).is_fatal());

        let client_error = reqwest::blocking::Client::new().get("not a url").send().unwrap_err();
        assert!(MapError::from(client_error).is_fatal());
    }
}
