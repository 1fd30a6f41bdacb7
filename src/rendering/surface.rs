use std::sync::Arc;

use crate::{
    core::{
        geo::{Point, TileIndex, ViewportSize},
        transform::LayerTransform,
    },
    layers::vector::VectorPath,
};

/// The 2D scene the map draws into.
///
/// Images belong to the raster group and are keyed by tile; paths belong to
/// the vector overlay and are keyed by point index. Implementations only
/// store and display what they are told: all reconciliation happens in the
/// layers.
pub trait RenderSurface {
    /// Sets the translate + uniform scale applied to the whole raster group.
    fn set_raster_transform(&mut self, transform: &LayerTransform);

    /// Adds a tile image at `offset` inside the raster group. It stays blank
    /// until [`set_image_data`](Self::set_image_data) is called.
    fn insert_image(&mut self, tile: TileIndex, href: &str, offset: Point, size: f64);

    /// Supplies the loaded bytes of a previously inserted tile image.
    fn set_image_data(&mut self, tile: TileIndex, data: Arc<Vec<u8>>);

    /// Removes a tile image and releases whatever backs it.
    fn remove_image(&mut self, tile: TileIndex);

    /// Creates or updates the path drawn for point `id`.
    fn draw_path(&mut self, id: usize, path: &VectorPath);

    fn resize(&mut self, _size: ViewportSize) {}
}
