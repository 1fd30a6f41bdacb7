//! Engine-wide numbers for the earthquake map.
//! Keeping them in a single place makes it easier to tweak the view defaults.

use std::f64::consts::PI;

/// Square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// `log2(TILE_SIZE)`, the offset between world scale and tile zoom.
pub const TILE_SIZE_LOG2: f64 = 8.0;

/// Full turn in radians. At plane scale 1 the globe is `1 / TAU` wide per radian.
pub const TAU: f64 = 2.0 * PI;

/// Smallest allowed view scale (world width in pixels).
pub const MIN_SCALE: f64 = (1u32 << 11) as f64;

/// Largest allowed view scale (world width in pixels).
pub const MAX_SCALE: f64 = (1u32 << 24) as f64;

/// Scale applied when the dataset is first placed.
pub const INITIAL_SCALE: f64 = (1u32 << 14) as f64;

/// Initial view center as (longitude, latitude): roughly the middle of California.
pub const INITIAL_CENTER: (f64, f64) = (-119.665, 37.414);

/// Largest rendered point radius in pixels.
pub const MAX_POINT_RADIUS: f64 = 10.0;

/// Viewport floor in pixels.
pub const MIN_VIEWPORT_WIDTH: f64 = 960.0;
pub const MIN_VIEWPORT_HEIGHT: f64 = 500.0;

/// Distance in radians kept from the poles, where Mercator `y` diverges.
pub const POLE_EPSILON: f64 = 1e-12;

/// Default raster basemap endpoint.
pub const DEFAULT_TILE_TEMPLATE: &str =
    "https://{mirror}.basemaps.example.com/rastertiles/voyager/{z}/{x}/{y}.png";
