use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::constants::{MIN_VIEWPORT_HEIGHT, MIN_VIEWPORT_WIDTH, TILE_SIZE};

/// A geographic position in degrees, longitude first (GeoJSON order).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    /// Creates a new coordinate
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }
}

impl Default for LngLat {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<(f64, f64)> for LngLat {
    fn from((lng, lat): (f64, f64)) -> Self {
        Self::new(lng, lat)
    }
}

/// Represents a point in screen or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Identifies one 256×256 raster tile in the slippy map grid.
///
/// `x` is the column, `y` the row and `z` the zoom level; at level `z` the
/// grid has `2^z` tiles per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    pub z: u8,
    pub y: u32,
    pub x: u32,
}

impl TileIndex {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Number of tiles per axis at this zoom level
    pub fn tiles_per_axis(&self) -> u32 {
        1u32 << self.z
    }

    /// Top-left corner of the tile inside the raster group, in unscaled tile pixels
    pub fn pixel_offset(&self) -> Point {
        let size = TILE_SIZE as f64;
        Point::new(self.x as f64 * size, self.y as f64 * size)
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Pixel size of the rendering viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Applies the 960×500 floor used for full-window maps.
    pub fn with_minimum(width: f64, height: f64) -> Self {
        Self::new(width.max(MIN_VIEWPORT_WIDTH), height.max(MIN_VIEWPORT_HEIGHT))
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x >= 0.0 && point.x < self.width && point.y >= 0.0 && point.y < self.height
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(MIN_VIEWPORT_WIDTH, MIN_VIEWPORT_HEIGHT)
    }
}
