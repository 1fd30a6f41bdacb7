//! The interaction controller
//!
//! Owns the view transform and runs the repaint pipeline synchronously on
//! every transform change: clamp, store, re-parameterize the projection,
//! redraw the overlay, resolve tiles and reconcile the raster layer. The
//! last transform applied always wins; nothing is queued or debounced.

use std::sync::Arc;
use std::time::Duration;

use crate::{
    core::{
        config::MapConfig,
        geo::{Point, ViewportSize},
        projection::MercatorProjection,
        transform::{ScaleExtent, ViewTransform},
    },
    data::{geojson::GeoPoint, source::DatasetSource},
    input::{events::GestureEvent, zoom::ZoomBehavior},
    layers::{raster::RasterLayer, vector::VectorOverlay},
    rendering::surface::RenderSurface,
    tiles::{
        cache::TileCache,
        grid::resolve_tiles,
        loader::{HttpTileFetcher, TileFetcher, TileLoader},
        source::{TemplateTileSource, TileSource},
    },
    Result,
};

/// What one run of the repaint pipeline did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepaintSummary {
    /// Transform the repaint was based on, after clamping
    pub transform: ViewTransform,
    pub zoom: u8,
    pub visible_tiles: usize,
    pub tiles_added: usize,
    pub tiles_removed: usize,
    pub paths: usize,
}

pub struct InteractionController<S: RenderSurface> {
    config: MapConfig,
    size: ViewportSize,
    extent: ScaleExtent,
    /// `None` until the first transform has been applied
    transform: Option<ViewTransform>,
    projection: MercatorProjection,
    raster: RasterLayer,
    overlay: VectorOverlay,
    surface: S,
}

impl<S: RenderSurface> InteractionController<S> {
    pub fn new(
        config: MapConfig,
        mut surface: S,
        source: Box<dyn TileSource>,
        fetcher: Arc<dyn TileFetcher>,
    ) -> Result<Self> {
        config.validate()?;

        let size = ViewportSize::with_minimum(config.view.width, config.view.height);
        surface.resize(size);

        let loader = TileLoader::with_config(fetcher, &config.loading)?;
        let cache = TileCache::new(config.loading.cache_capacity);
        let raster = RasterLayer::new(source, loader, cache);
        let overlay = VectorOverlay::new(config.overlay.radius_range);

        log::debug!(
            "controller ready: {}x{} viewport, scale extent [{}, {}], {} tile workers",
            size.width,
            size.height,
            config.view.min_scale,
            config.view.max_scale,
            config.loading.workers
        );

        Ok(Self {
            extent: config.view.scale_extent(),
            config,
            size,
            transform: None,
            projection: MercatorProjection::unit(),
            raster,
            overlay,
            surface,
        })
    }

    /// Controller fetching tiles over HTTP from the configured template.
    ///
    /// Builds a blocking HTTP client, so it must not be called from inside
    /// an async runtime.
    pub fn with_http_tiles(config: MapConfig, surface: S) -> Result<Self> {
        let source = TemplateTileSource::from_config(&config.tiles);
        let fetcher = HttpTileFetcher::new(&config.loading)?;
        Self::new(config, surface, Box::new(source), Arc::new(fetcher))
    }

    /// Loads the dataset, then initializes the overlay and places the view.
    ///
    /// A load failure is returned as is and leaves the controller untouched.
    pub async fn load(&mut self, source: &dyn DatasetSource) -> Result<RepaintSummary> {
        let dataset = source.load(&self.config.overlay.weight_properties).await?;
        log::info!(
            "dataset {}: {} points, {} skipped",
            source.name(),
            dataset.len(),
            dataset.skipped.len()
        );
        Ok(self.initialize(dataset.points))
    }

    /// Builds the overlay from `points` and applies the initial transform.
    pub fn initialize(&mut self, points: Vec<GeoPoint>) -> RepaintSummary {
        let created = self.overlay.initialize(points);
        log::debug!("overlay initialized with {} paths", created);
        let initial = self.initial_transform();
        self.repaint(initial)
    }

    /// Transform that puts the configured center in the middle of the
    /// viewport at the configured initial scale.
    pub fn initial_transform(&self) -> ViewTransform {
        let view = &self.config.view;
        let plane = MercatorProjection::unit().project(view.initial_center);
        ViewTransform::centered_on(plane, self.extent.clamp(view.initial_scale), self.size.center())
    }

    /// Entry point for every gesture-reported transform.
    ///
    /// Returns `None` when the transform is not finite or has a non-positive
    /// scale; such reports are dropped and the previous state is kept.
    pub fn on_transform_changed(&mut self, transform: ViewTransform) -> Option<RepaintSummary> {
        if !transform.is_finite() || !(transform.k > 0.0) {
            log::warn!("ignoring invalid transform {:?}", transform);
            return None;
        }
        Some(self.repaint(transform))
    }

    pub fn on_gesture(&mut self, event: GestureEvent) -> Option<RepaintSummary> {
        self.on_transform_changed(event.transform())
    }

    fn repaint(&mut self, transform: ViewTransform) -> RepaintSummary {
        let transform = self.extent.constrain(transform);
        self.transform = Some(transform);
        self.projection.set_view(&transform);

        self.overlay.redraw(&self.projection, &mut self.surface);

        let grid = resolve_tiles(self.size, &transform);
        let report = self.raster.reconcile(&grid, &mut self.surface);

        log::debug!(
            "repaint k={} t=({:.1}, {:.1}): z{} {} tiles (+{} -{}), {} paths",
            transform.k,
            transform.x,
            transform.y,
            grid.zoom,
            grid.len(),
            report.added.len(),
            report.removed.len(),
            self.overlay.len()
        );

        RepaintSummary {
            transform,
            zoom: grid.zoom,
            visible_tiles: grid.len(),
            tiles_added: report.added.len(),
            tiles_removed: report.removed.len(),
            paths: self.overlay.len(),
        }
    }

    /// Applies tile downloads that have finished. Returns how many arrived.
    pub fn poll_tile_loads(&mut self) -> usize {
        self.raster.poll(&mut self.surface)
    }

    /// Blocks until every displayed tile has finished loading or `timeout`
    /// elapses.
    pub fn wait_for_tiles(&mut self, timeout: Duration) -> usize {
        self.raster.wait(timeout, &mut self.surface)
    }

    /// Diagnostic hover hook: logs and returns the topmost point under
    /// `screen`. Changes nothing.
    pub fn on_hover(&self, screen: Point) -> Option<&GeoPoint> {
        let index = self.overlay.hit_test(&screen)?;
        let point = self.overlay.points().get(index)?;
        log::info!(
            "hover {}: magnitude {} at ({}, {})",
            point.id.as_deref().unwrap_or("<unnamed>"),
            point.magnitude,
            point.position.lng,
            point.position.lat
        );
        Some(point)
    }

    /// Applies a new viewport size and repaints under the current transform.
    pub fn resize(&mut self, width: f64, height: f64) -> Option<RepaintSummary> {
        self.size = ViewportSize::with_minimum(width, height);
        self.surface.resize(self.size);
        let transform = self.transform?;
        Some(self.repaint(transform))
    }

    /// Gesture source matching this controller's scale extent.
    pub fn zoom_behavior(&self) -> ZoomBehavior {
        ZoomBehavior::new(self.extent)
    }

    pub fn transform(&self) -> Option<ViewTransform> {
        self.transform
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn projection(&self) -> &MercatorProjection {
        &self.projection
    }

    pub fn raster(&self) -> &RasterLayer {
        &self.raster
    }

    pub fn overlay(&self) -> &VectorOverlay {
        &self.overlay
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
