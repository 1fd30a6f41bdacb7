//! Visible tile resolution
//!
//! Turns a view transform and a viewport size into the set of raster tiles
//! that intersect the screen, plus the group transform that lines the tiles
//! up with the continuous view scale.

use crate::core::{
    constants::{TILE_SIZE, TILE_SIZE_LOG2},
    geo::{Point, TileIndex, ViewportSize},
    transform::{LayerTransform, ViewTransform},
};

/// Highest tile zoom the resolver will produce. Keeps `1 << z` in range for
/// transforms far outside the usual scale extent.
pub const MAX_TILE_ZOOM: u8 = 30;

/// Result of [`resolve_tiles`].
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    /// Discrete zoom level of every tile in the grid
    pub zoom: u8,
    /// On-screen size of one tile in pixels
    pub tile_scale: f64,
    /// Screen position of the grid's top-left corner, in tile units
    pub origin: Point,
    tiles: Vec<TileIndex>,
}

impl TileGrid {
    fn empty(zoom: u8, tile_scale: f64, origin: Point) -> Self {
        Self {
            zoom,
            tile_scale,
            origin,
            tiles: Vec::new(),
        }
    }

    /// Visible tiles, row by row
    pub fn tiles(&self) -> &[TileIndex] {
        &self.tiles
    }

    /// Visible tiles with their pixel offsets inside the raster group
    pub fn placements(&self) -> impl Iterator<Item = (TileIndex, Point)> + '_ {
        self.tiles.iter().map(|tile| (*tile, tile.pixel_offset()))
    }

    pub fn contains(&self, tile: &TileIndex) -> bool {
        tile.z == self.zoom && self.tiles.contains(tile)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn layer_transform(&self) -> LayerTransform {
        LayerTransform::from_tile_scale(self.tile_scale, self.origin)
    }

    /// Screen rectangle `(min, max)` covered by a tile of this grid
    pub fn screen_bounds(&self, tile: &TileIndex) -> (Point, Point) {
        let min = Point::new(
            (self.origin.x + tile.x as f64) * self.tile_scale,
            (self.origin.y + tile.y as f64) * self.tile_scale,
        );
        (min, Point::new(min.x + self.tile_scale, min.y + self.tile_scale))
    }
}

/// Computes the tiles covering a `size` viewport under `transform`.
///
/// The transform scale `k` is the world width in pixels, so the tile zoom is
/// `round(log2(k) - 8)` and each tile is drawn `2^(log2(k) - 8 - z) * 256`
/// pixels wide. Rows and columns are clamped to the world; no wrapping.
pub fn resolve_tiles(size: ViewportSize, transform: &ViewTransform) -> TileGrid {
    let scale = transform.k;
    let z = (scale.log2() - TILE_SIZE_LOG2).max(0.0).min(MAX_TILE_ZOOM as f64);
    let zoom = z.round() as u8;
    let tile_scale = 2f64.powf(z - zoom as f64 + TILE_SIZE_LOG2);

    // top-left corner of the projected world on screen
    let world_x = transform.x - scale / 2.0;
    let world_y = transform.y - scale / 2.0;
    let origin = Point::new(world_x / tile_scale, world_y / tile_scale);

    if !(scale > 0.0) || !transform.is_finite() || !(size.width > 0.0 && size.height > 0.0) {
        return TileGrid::empty(zoom, tile_scale, origin);
    }

    let per_axis = 1i64 << zoom;
    let span = |lo: f64, hi: f64, world: f64| -> (i64, i64) {
        let first = (((lo - world) / tile_scale).floor() as i64).max(0);
        let end = (((hi - world) / tile_scale).ceil() as i64).min(per_axis).max(0);
        (first, end)
    };
    let (col_start, col_end) = span(0.0, size.width, world_x);
    let (row_start, row_end) = span(0.0, size.height, world_y);

    let mut tiles = Vec::new();
    for y in row_start..row_end {
        for x in col_start..col_end {
            tiles.push(TileIndex::new(x as u32, y as u32, zoom));
        }
    }

    log::trace!(
        "resolved {} tiles at z{} (tile scale {:.2}, {}px tiles)",
        tiles.len(),
        zoom,
        tile_scale,
        TILE_SIZE
    );

    TileGrid {
        zoom,
        tile_scale,
        origin,
        tiles,
    }
}
