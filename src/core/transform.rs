use serde::{Deserialize, Serialize};

use crate::core::{
    constants::{MAX_SCALE, MIN_SCALE, TILE_SIZE},
    geo::Point,
};

/// The pan/zoom view state: plane coordinates `p` map to screen pixels
/// `(x + k * p.x, y + k * p.y)`.
///
/// `k` is the width of the projected world in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl ViewTransform {
    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Transform with scale `k` that places the plane point `plane` at `screen`.
    pub fn centered_on(plane: Point, k: f64, screen: Point) -> Self {
        Self::new(k, screen.x - k * plane.x, screen.y - k * plane.y)
    }

    pub fn is_finite(&self) -> bool {
        self.k.is_finite() && self.x.is_finite() && self.y.is_finite()
    }

    pub fn translate(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Plane → screen
    pub fn apply(&self, plane: Point) -> Point {
        Point::new(self.x + self.k * plane.x, self.y + self.k * plane.y)
    }

    /// Screen → plane
    pub fn invert(&self, screen: Point) -> Point {
        Point::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
    }

    /// Moves the view by a screen-pixel offset.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.k, self.x + dx, self.y + dy)
    }

    /// Rescales to `k` keeping the plane point under `focal` fixed on screen.
    pub fn scaled_to(&self, k: f64, focal: Point) -> Self {
        Self::centered_on(self.invert(focal), k, focal)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Closed interval of allowed view scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleExtent {
    pub min: f64,
    pub max: f64,
}

impl ScaleExtent {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, k: f64) -> f64 {
        k.clamp(self.min, self.max)
    }

    pub fn contains(&self, k: f64) -> bool {
        k >= self.min && k <= self.max
    }

    /// Clamps only the scale; translation is left as reported.
    pub fn constrain(&self, transform: ViewTransform) -> ViewTransform {
        ViewTransform::new(self.clamp(transform.k), transform.x, transform.y)
    }
}

impl Default for ScaleExtent {
    fn default() -> Self {
        Self::new(MIN_SCALE, MAX_SCALE)
    }
}

/// Group transform applied to the whole raster layer.
///
/// Tiles are positioned at `index * 256` inside the group; the group's
/// uniform scale stretches the nearest discrete zoom level to the continuous
/// gesture scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerTransform {
    pub translate: Point,
    pub scale: f64,
}

impl LayerTransform {
    /// Builds the group transform for tiles spanning `tile_scale` pixels whose
    /// grid origin sits at `origin` (in tile units). Translations are snapped
    /// to whole pixels when the tile scale is integral.
    pub fn from_tile_scale(tile_scale: f64, origin: Point) -> Self {
        let mut tx = origin.x * tile_scale;
        let mut ty = origin.y * tile_scale;
        if tile_scale.fract() == 0.0 {
            tx = tx.round();
            ty = ty.round();
        }

        Self {
            translate: Point::new(tx, ty),
            scale: tile_scale / TILE_SIZE as f64,
        }
    }

    pub fn identity() -> Self {
        Self {
            translate: Point::default(),
            scale: 1.0,
        }
    }

    /// Group-local → screen
    pub fn apply(&self, local: Point) -> Point {
        Point::new(
            self.translate.x + self.scale * local.x,
            self.translate.y + self.scale * local.y,
        )
    }

    pub fn to_svg_transform(&self) -> String {
        format!(
            "translate({}, {}) scale({})",
            self.translate.x, self.translate.y, self.scale
        )
    }
}

impl Default for LayerTransform {
    fn default() -> Self {
        Self::identity()
    }
}
