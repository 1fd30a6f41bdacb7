//! Prelude module for common quakemap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use quakemap::prelude::*;`

pub use crate::core::{
    config::{MapConfig, OverlayConfig, TileLoadingConfig, TileSourceConfig, ViewConfig},
    geo::{LngLat, Point, TileIndex, ViewportSize},
    projection::MercatorProjection,
    transform::{LayerTransform, ScaleExtent, ViewTransform},
};

pub use crate::data::{
    geojson::{Dataset, GeoPoint},
    source::{source_for, DatasetSource},
};

pub use crate::input::{
    controller::{InteractionController, RepaintSummary},
    events::GestureEvent,
    zoom::ZoomBehavior,
};

pub use crate::layers::{raster::RasterLayer, vector::VectorOverlay};

pub use crate::rendering::{scene::SceneGraph, surface::RenderSurface};

pub use crate::tiles::{
    grid::{resolve_tiles, TileGrid},
    loader::{TileFetcher, TileLoader},
    source::{TemplateTileSource, TileSource},
};

pub use crate::{MapError, Result};

/// Fast hash map used for internal lookups
pub type HashMap<K, V> = fxhash::FxHashMap<K, V>;
/// Fast hash set used for internal lookups
pub type HashSet<T> = fxhash::FxHashSet<T>;
