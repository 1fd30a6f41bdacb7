//! Retained in-memory scene
//!
//! [`SceneGraph`] records everything the layers ask a surface to display. It
//! backs headless rendering and the tests, and serializes itself as an SVG
//! document shaped like the browser scene: one `<g>` for the raster tiles,
//! one `<path>` per point.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use crate::{
    core::{
        geo::{Point, TileIndex, ViewportSize},
        transform::LayerTransform,
    },
    layers::vector::VectorPath,
    rendering::surface::RenderSurface,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub href: String,
    pub offset: Point,
    pub size: f64,
    pub data: Option<Arc<Vec<u8>>>,
}

impl ImageNode {
    pub fn is_rendered(&self) -> bool {
        self.data.is_some()
    }
}

/// Counters of surface mutations, used to check that repaints do not churn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub images_inserted: usize,
    pub images_removed: usize,
    pub images_filled: usize,
    pub path_updates: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    size: ViewportSize,
    raster_transform: LayerTransform,
    images: BTreeMap<TileIndex, ImageNode>,
    paths: BTreeMap<usize, VectorPath>,
    stats: SceneStats,
}

impl SceneGraph {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn raster_transform(&self) -> LayerTransform {
        self.raster_transform
    }

    pub fn images(&self) -> &BTreeMap<TileIndex, ImageNode> {
        &self.images
    }

    pub fn image(&self, tile: &TileIndex) -> Option<&ImageNode> {
        self.images.get(tile)
    }

    pub fn paths(&self) -> &BTreeMap<usize, VectorPath> {
        &self.paths
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    /// Serializes the scene as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        // writing into a String cannot fail
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{}" height="{}">"#,
            self.size.width, self.size.height
        );
        let _ = writeln!(svg, r#"  <g transform="{}">"#, self.raster_transform.to_svg_transform());
        for node in self.images.values() {
            let _ = writeln!(
                svg,
                r#"    <image xlink:href="{}" x="{}" y="{}" width="{}" height="{}"/>"#,
                escape_attr(&node.href),
                node.offset.x,
                node.offset.y,
                node.size,
                node.size
            );
        }
        svg.push_str("  </g>\n");
        for path in self.paths.values() {
            let _ = writeln!(svg, r#"  <path d="{}"/>"#, path.path_data());
        }
        svg.push_str("</svg>\n");
        svg
    }
}

impl RenderSurface for SceneGraph {
    fn set_raster_transform(&mut self, transform: &LayerTransform) {
        self.raster_transform = *transform;
    }

    fn insert_image(&mut self, tile: TileIndex, href: &str, offset: Point, size: f64) {
        self.stats.images_inserted += 1;
        self.images.insert(
            tile,
            ImageNode {
                href: href.to_string(),
                offset,
                size,
                data: None,
            },
        );
    }

    fn set_image_data(&mut self, tile: TileIndex, data: Arc<Vec<u8>>) {
        if let Some(node) = self.images.get_mut(&tile) {
            self.stats.images_filled += 1;
            node.data = Some(data);
        }
    }

    fn remove_image(&mut self, tile: TileIndex) {
        if self.images.remove(&tile).is_some() {
            self.stats.images_removed += 1;
        }
    }

    fn draw_path(&mut self, id: usize, path: &VectorPath) {
        self.stats.path_updates += 1;
        self.paths.insert(id, *path);
    }

    fn resize(&mut self, size: ViewportSize) {
        self.size = size;
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
