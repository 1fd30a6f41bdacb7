//! Configuration for the map view, tile retrieval and the point overlay
//!
//! Every section has defaults matching the stock earthquake map, and every
//! section deserializes with `#[serde(default)]` so a JSON document only needs
//! to name the values it changes.

use serde::{Deserialize, Serialize};

use crate::{
    core::{
        constants::{
            DEFAULT_TILE_TEMPLATE, INITIAL_CENTER, INITIAL_SCALE, MAX_POINT_RADIUS, MAX_SCALE,
            MIN_SCALE, MIN_VIEWPORT_HEIGHT, MIN_VIEWPORT_WIDTH,
        },
        geo::{LngLat, ViewportSize},
        transform::ScaleExtent,
    },
    MapError, Result,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub view: ViewConfig,
    pub tiles: TileSourceConfig,
    pub loading: TileLoadingConfig,
    pub overlay: OverlayConfig,
}

impl MapConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| MapError::InvalidConfig(format!("malformed configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.view.validate()?;
        self.tiles.validate()?;
        self.loading.validate()?;
        self.overlay.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub width: f64,
    pub height: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub initial_scale: f64,
    pub initial_center: LngLat,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: MIN_VIEWPORT_WIDTH,
            height: MIN_VIEWPORT_HEIGHT,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            initial_scale: INITIAL_SCALE,
            initial_center: LngLat::from(INITIAL_CENTER),
        }
    }
}

impl ViewConfig {
    pub fn size(&self) -> ViewportSize {
        ViewportSize::new(self.width, self.height)
    }

    pub fn scale_extent(&self) -> ScaleExtent {
        ScaleExtent::new(self.min_scale, self.max_scale)
    }

    fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.height > 0.0) || !self.width.is_finite() || !self.height.is_finite() {
            return Err(MapError::InvalidConfig(format!(
                "viewport must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) || !self.max_scale.is_finite() {
            return Err(MapError::InvalidConfig(format!(
                "scale extent [{}, {}] is not a positive interval",
                self.min_scale, self.max_scale
            )));
        }
        if !self.scale_extent().contains(self.initial_scale) {
            return Err(MapError::InvalidConfig(format!(
                "initial scale {} outside [{}, {}]",
                self.initial_scale, self.min_scale, self.max_scale
            )));
        }
        if !self.initial_center.is_finite() {
            return Err(MapError::InvalidConfig("initial center must be finite".to_string()));
        }
        Ok(())
    }
}

/// How a tile picks one of the identical mirror hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorSelection {
    /// `y mod n`
    Row,
    /// `(x + y) mod n`
    ColumnRowSum,
    /// Always the mirror at this position
    Fixed(usize),
}

impl Default for MirrorSelection {
    fn default() -> Self {
        Self::Row
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileSourceConfig {
    /// URL template with `{mirror}` (or `{s}`), `{z}`, `{x}` and `{y}` placeholders
    pub url_template: String,
    pub mirrors: Vec<String>,
    pub mirror_selection: MirrorSelection,
}

impl Default for TileSourceConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_TILE_TEMPLATE.to_string(),
            mirrors: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            mirror_selection: MirrorSelection::Row,
        }
    }
}

impl TileSourceConfig {
    pub fn uses_mirrors(&self) -> bool {
        self.url_template.contains("{mirror}") || self.url_template.contains("{s}")
    }

    fn validate(&self) -> Result<()> {
        if self.url_template.trim().is_empty() {
            return Err(MapError::InvalidConfig("tile url template is empty".to_string()));
        }
        if self.uses_mirrors() && self.mirrors.is_empty() {
            return Err(MapError::InvalidConfig(
                "tile url template names a mirror but no mirrors are configured".to_string(),
            ));
        }
        if let MirrorSelection::Fixed(i) = self.mirror_selection {
            if self.uses_mirrors() && i >= self.mirrors.len() {
                return Err(MapError::InvalidConfig(format!(
                    "fixed mirror {} out of range ({} mirrors)",
                    i,
                    self.mirrors.len()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileLoadingConfig {
    /// Background fetch workers
    pub workers: usize,
    /// Fetched tiles kept in memory; 0 disables the cache
    pub cache_capacity: usize,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for TileLoadingConfig {
    fn default() -> Self {
        Self {
            workers: 6,
            cache_capacity: 256,
            user_agent: concat!("quakemap/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl TileLoadingConfig {
    pub fn low_resource() -> Self {
        Self {
            workers: 2,
            cache_capacity: 64,
            ..Default::default()
        }
    }

    pub fn high_performance() -> Self {
        Self {
            workers: 16,
            cache_capacity: 1024,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(MapError::InvalidConfig("at least one tile worker is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Pixel radius for weight 0 and for the dataset's largest weight
    pub radius_range: (f64, f64),
    /// Feature properties tried in order for the point weight
    pub weight_properties: Vec<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            radius_range: (0.0, MAX_POINT_RADIUS),
            weight_properties: vec!["mag".to_string(), "magnitude".to_string()],
        }
    }
}

impl OverlayConfig {
    fn validate(&self) -> Result<()> {
        let (r0, r1) = self.radius_range;
        if !(r0 >= 0.0 && r0 <= r1) || !r1.is_finite() {
            return Err(MapError::InvalidConfig(format!(
                "radius range ({}, {}) must be non-negative and ordered",
                r0, r1
            )));
        }
        if self.weight_properties.is_empty() {
            return Err(MapError::InvalidConfig("no weight property configured".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = MapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.view.initial_scale, 16384.0);
        assert_eq!(config.view.scale_extent(), ScaleExtent::new(2048.0, 16_777_216.0));
        assert_eq!(config.tiles.mirrors.len(), 3);
    }

    #[test]
    fn test_partial_json() {
        let config = MapConfig::from_json_str(
            r#"{ "view": { "width": 1280 }, "tiles": { "mirror_selection": "column_row_sum" } }"#,
        )
        .unwrap();
        assert_eq!(config.view.width, 1280.0);
        assert_eq!(config.view.height, 500.0);
        assert_eq!(config.tiles.mirror_selection, MirrorSelection::ColumnRowSum);
        assert_eq!(config.loading.workers, 6);
    }

    #[test]
    fn test_fixed_mirror_json() {
        let config =
            MapConfig::from_json_str(r#"{ "tiles": { "mirror_selection": { "fixed": 2 } } }"#).unwrap();
        assert_eq!(config.tiles.mirror_selection, MirrorSelection::Fixed(2));
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = MapConfig::default();
        config.view.initial_scale = 10.0;
        assert!(matches!(config.validate(), Err(MapError::InvalidConfig(_))));

        let mut config = MapConfig::default();
        config.tiles.mirrors.clear();
        assert!(config.validate().is_err());

        let mut config = MapConfig::default();
        config.tiles.mirror_selection = MirrorSelection::Fixed(3);
        assert!(config.validate().is_err());

        let mut config = MapConfig::default();
        config.loading.workers = 0;
        assert!(config.validate().is_err());

        let mut config = MapConfig::default();
        config.overlay.radius_range = (5.0, 1.0);
        assert!(config.validate().is_err());

        assert!(MapConfig::from_json_str("{ not json").is_err());
    }
}
