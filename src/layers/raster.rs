//! Raster basemap layer
//!
//! Keeps the displayed tile images equal to the visible tile set by plain
//! set difference: tiles that left the view are removed, tiles that entered
//! it are created and their download started. Downloads finish on the
//! loader's worker threads; completions are applied here, on the caller's
//! thread, and only if the handle that requested them is still displayed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{
    core::{constants::TILE_SIZE, geo::TileIndex, transform::LayerTransform},
    prelude::{HashMap, HashSet},
    rendering::surface::RenderSurface,
    tiles::{
        cache::TileCache,
        grid::TileGrid,
        loader::{TileLoadResult, TileLoader, TileRequest},
        source::TileSource,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    Loading,
    Loaded,
    /// Left blank; requested again only if the tile leaves and re-enters the view
    Failed,
}

/// A displayed tile image.
#[derive(Debug, Clone)]
pub struct TileImageHandle {
    pub tile: TileIndex,
    pub url: String,
    pub ticket: u64,
    pub status: TileStatus,
    pub data: Option<Arc<Vec<u8>>>,
}

/// What a reconcile pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<TileIndex>,
    pub removed: Vec<TileIndex>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// How a finished download was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    Failed,
    /// The tile was reconciled away before the download finished. A
    /// successful download is still cached.
    Discarded,
}

pub struct RasterLayer {
    source: Box<dyn TileSource>,
    loader: TileLoader,
    cache: TileCache,
    displayed: HashMap<TileIndex, TileImageHandle>,
    /// Ticket of the one outstanding download per tile
    in_flight: HashMap<TileIndex, u64>,
    layer_transform: LayerTransform,
    next_ticket: u64,
}

impl RasterLayer {
    pub fn new(source: Box<dyn TileSource>, loader: TileLoader, cache: TileCache) -> Self {
        Self {
            source,
            loader,
            cache,
            displayed: HashMap::default(),
            in_flight: HashMap::default(),
            layer_transform: LayerTransform::identity(),
            next_ticket: 0,
        }
    }

    /// Makes the displayed images match `grid` and applies its group transform.
    pub fn reconcile(&mut self, grid: &TileGrid, surface: &mut dyn RenderSurface) -> ReconcileReport {
        self.layer_transform = grid.layer_transform();
        surface.set_raster_transform(&self.layer_transform);

        let visible: HashSet<TileIndex> = grid.tiles().iter().copied().collect();
        let mut report = ReconcileReport::default();

        let mut to_remove: Vec<TileIndex> = self
            .displayed
            .keys()
            .filter(|tile| !visible.contains(*tile))
            .copied()
            .collect();
        to_remove.sort();
        for tile in to_remove {
            self.displayed.remove(&tile);
            surface.remove_image(tile);
            report.removed.push(tile);
        }

        for (tile, offset) in grid.placements() {
            if self.displayed.contains_key(&tile) {
                continue;
            }

            let url = self.source.url(&tile);
            surface.insert_image(tile, &url, offset, TILE_SIZE as f64);

            let mut handle = TileImageHandle {
                tile,
                url,
                ticket: self.next_ticket,
                status: TileStatus::Loading,
                data: None,
            };

            if let Some(data) = self.cache.get(&tile) {
                surface.set_image_data(tile, Arc::clone(&data));
                handle.status = TileStatus::Loaded;
                handle.data = Some(data);
                self.next_ticket += 1;
            } else if let Some(ticket) = self.in_flight.get(&tile) {
                // still downloading from an earlier visit
                handle.ticket = *ticket;
            } else {
                self.next_ticket += 1;
                self.in_flight.insert(tile, handle.ticket);
                self.loader.request(TileRequest {
                    tile,
                    url: handle.url.clone(),
                    ticket: handle.ticket,
                });
            }

            self.displayed.insert(tile, handle);
            report.added.push(tile);
        }

        if !report.is_empty() {
            log::debug!(
                "raster z{}: +{} -{} tiles ({} displayed)",
                grid.zoom,
                report.added.len(),
                report.removed.len(),
                self.displayed.len()
            );
        }
        report
    }

    /// Caches a finished download and displays it if its handle is still
    /// wanted.
    pub fn apply_load_result(&mut self, result: TileLoadResult, surface: &mut dyn RenderSurface) -> LoadOutcome {
        if self.in_flight.get(&result.tile) == Some(&result.ticket) {
            self.in_flight.remove(&result.tile);
        }

        let data = match result.data {
            Ok(bytes) => {
                let data = Arc::new(bytes);
                self.cache.put(result.tile, Arc::clone(&data));
                Ok(data)
            }
            Err(e) => Err(e),
        };

        let handle = match self.displayed.get_mut(&result.tile) {
            Some(handle) if handle.ticket == result.ticket && handle.status == TileStatus::Loading => handle,
            _ => {
                log::debug!("tile {} no longer displayed (ticket {})", result.tile, result.ticket);
                return LoadOutcome::Discarded;
            }
        };

        match data {
            Ok(data) => {
                surface.set_image_data(result.tile, Arc::clone(&data));
                handle.status = TileStatus::Loaded;
                handle.data = Some(data);
                LoadOutcome::Loaded
            }
            Err(e) => {
                log::warn!("tile {} left blank: {}", result.tile, e);
                handle.status = TileStatus::Failed;
                LoadOutcome::Failed
            }
        }
    }

    /// Applies every completion that is already available.
    pub fn poll(&mut self, surface: &mut dyn RenderSurface) -> usize {
        let results = self.loader.try_recv_results();
        let count = results.len();
        for result in results {
            self.apply_load_result(result, surface);
        }
        count
    }

    /// Blocks until no displayed tile is loading or `timeout` elapses.
    /// Returns the number of completions applied.
    pub fn wait(&mut self, timeout: Duration, surface: &mut dyn RenderSurface) -> usize {
        let deadline = Instant::now() + timeout;
        let mut applied = 0;

        while self.pending_count() > 0 {
            let now = Instant::now();
            if now >= deadline {
                log::debug!("gave up waiting on {} tiles", self.pending_count());
                break;
            }
            match self.loader.recv_timeout(deadline - now) {
                Some(result) => {
                    self.apply_load_result(result, surface);
                    applied += 1;
                }
                None => break,
            }
        }
        applied
    }

    pub fn handle(&self, tile: &TileIndex) -> Option<&TileImageHandle> {
        self.displayed.get(tile)
    }

    /// Displayed tiles in index order
    pub fn displayed(&self) -> Vec<TileIndex> {
        let mut tiles: Vec<TileIndex> = self.displayed.keys().copied().collect();
        tiles.sort();
        tiles
    }

    pub fn displayed_count(&self) -> usize {
        self.displayed.len()
    }

    /// Downloads requested and not yet applied, displayed or not
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn pending_count(&self) -> usize {
        self.displayed
            .values()
            .filter(|handle| handle.status == TileStatus::Loading)
            .count()
    }

    pub fn layer_transform(&self) -> LayerTransform {
        self.layer_transform
    }

    pub fn cache(&self) -> &TileCache {
        &self.cache
    }
}

impl std::fmt::Debug for RasterLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterLayer")
            .field("displayed", &self.displayed.len())
            .field("pending", &self.pending_count())
            .field("in_flight", &self.in_flight.len())
            .field("layer_transform", &self.layer_transform)
            .field("loader", &self.loader)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            geo::ViewportSize,
            transform::ViewTransform,
        },
        rendering::scene::SceneGraph,
        tiles::{
            grid::resolve_tiles,
            loader::TileFetcher,
            source::default_basemap,
        },
        MapError, Result,
    };

    /// Never answers: every tile stays loading until a result is injected.
    struct SilentFetcher;

    impl TileFetcher for SilentFetcher {
        fn fetch(&self, _request: &TileRequest) -> Result<Vec<u8>> {
            std::thread::sleep(Duration::from_secs(3600));
            Ok(Vec::new())
        }
    }

    fn layer(cache_capacity: usize) -> RasterLayer {
        let loader = TileLoader::new(Arc::new(SilentFetcher), 1).unwrap();
        RasterLayer::new(Box::new(default_basemap()), loader, TileCache::new(cache_capacity))
    }

    fn grid(k: f64, x: f64, y: f64) -> TileGrid {
        resolve_tiles(ViewportSize::new(960.0, 500.0), &ViewTransform::new(k, x, y))
    }

    fn ok(tile: TileIndex, ticket: u64) -> TileLoadResult {
        TileLoadResult { tile, ticket, data: Ok(vec![1, 2, 3]) }
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let mut raster = layer(16);
        let mut scene = SceneGraph::default();
        let g = grid(2048.0, 480.0, 250.0);

        let first = raster.reconcile(&g, &mut scene);
        assert_eq!(first.added.len(), g.len());
        assert!(first.removed.is_empty());

        let second = raster.reconcile(&g, &mut scene);
        assert!(second.is_empty());
        assert_eq!(scene.stats().images_inserted, g.len());
        assert_eq!(scene.stats().images_removed, 0);
    }

    #[test]
    fn test_displayed_matches_visible() {
        let mut raster = layer(16);
        let mut scene = SceneGraph::default();

        raster.reconcile(&grid(2048.0, 480.0, 250.0), &mut scene);
        let g = grid(4096.0, 100.0, -300.0);
        let report = raster.reconcile(&g, &mut scene);

        let mut expected = g.tiles().to_vec();
        expected.sort();
        assert_eq!(raster.displayed(), expected);
        assert_eq!(scene.images().keys().copied().collect::<Vec<_>>(), expected);
        assert!(!report.removed.is_empty());
        assert_eq!(scene.raster_transform(), g.layer_transform());
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let mut raster = layer(16);
        let mut scene = SceneGraph::default();
        let g = grid(2048.0, 480.0, 250.0);
        raster.reconcile(&g, &mut scene);

        let tile = g.tiles()[0];
        let ticket = raster.handle(&tile).unwrap().ticket;

        // wrong ticket
        assert_eq!(raster.apply_load_result(ok(tile, ticket + 1000), &mut scene), LoadOutcome::Discarded);
        // tile no longer displayed
        raster.reconcile(&grid(2048.0, -5000.0, 250.0), &mut scene);
        assert_eq!(raster.apply_load_result(ok(tile, ticket), &mut scene), LoadOutcome::Discarded);
        assert!(scene.images().is_empty());
    }

    #[test]
    fn test_reentering_tile_reuses_download() {
        let mut raster = layer(16);
        let mut scene = SceneGraph::default();
        let g = grid(2048.0, 480.0, 250.0);
        raster.reconcile(&g, &mut scene);
        assert_eq!(raster.in_flight_count(), g.len());

        let tile = g.tiles()[0];
        let ticket = raster.handle(&tile).unwrap().ticket;

        raster.reconcile(&grid(2048.0, -5000.0, 250.0), &mut scene);
        raster.reconcile(&g, &mut scene);

        // no second request: the handle waits on the first download
        assert_eq!(raster.in_flight_count(), g.len());
        assert_eq!(raster.handle(&tile).unwrap().ticket, ticket);
        assert_eq!(raster.apply_load_result(ok(tile, ticket), &mut scene), LoadOutcome::Loaded);
        assert!(scene.image(&tile).unwrap().is_rendered());
        assert_eq!(raster.in_flight_count(), g.len() - 1);
    }

    #[test]
    fn test_abandoned_download_is_cached() {
        let mut raster = layer(16);
        let mut scene = SceneGraph::default();
        let g = grid(2048.0, 480.0, 250.0);
        raster.reconcile(&g, &mut scene);

        let tile = g.tiles()[0];
        let ticket = raster.handle(&tile).unwrap().ticket;
        raster.reconcile(&grid(2048.0, -5000.0, 250.0), &mut scene);

        assert_eq!(raster.apply_load_result(ok(tile, ticket), &mut scene), LoadOutcome::Discarded);
        assert!(raster.cache().contains(&tile));

        raster.reconcile(&g, &mut scene);
        assert_eq!(raster.handle(&tile).unwrap().status, TileStatus::Loaded);
        assert!(scene.image(&tile).unwrap().is_rendered());
    }

    #[test]
    fn test_failure_leaves_other_tiles_alone() {
        let mut raster = layer(16);
        let mut scene = SceneGraph::default();
        let g = grid(2048.0, 480.0, 250.0);
        raster.reconcile(&g, &mut scene);

        let good = g.tiles()[0];
        let bad = g.tiles()[1];
        let good_ticket = raster.handle(&good).unwrap().ticket;
        let bad_ticket = raster.handle(&bad).unwrap().ticket;

        assert_eq!(raster.apply_load_result(ok(good, good_ticket), &mut scene), LoadOutcome::Loaded);
        let failed = TileLoadResult {
            tile: bad,
            ticket: bad_ticket,
            data: Err(MapError::tile(bad, "HTTP 404")),
        };
        assert_eq!(raster.apply_load_result(failed, &mut scene), LoadOutcome::Failed);

        assert_eq!(raster.handle(&bad).unwrap().status, TileStatus::Failed);
        assert!(!scene.image(&bad).unwrap().is_rendered());
        assert!(scene.image(&good).unwrap().is_rendered());
        assert_eq!(raster.displayed_count(), g.len());
        assert!(!raster.cache().contains(&bad));
    }

    #[test]
    fn test_cached_tiles_skip_download() {
        let mut raster = layer(16);
        let mut scene = SceneGraph::default();
        let g = grid(2048.0, 480.0, 250.0);
        raster.reconcile(&g, &mut scene);

        let tile = g.tiles()[0];
        let ticket = raster.handle(&tile).unwrap().ticket;
        raster.apply_load_result(ok(tile, ticket), &mut scene);

        raster.reconcile(&grid(2048.0, -5000.0, 250.0), &mut scene);
        raster.reconcile(&g, &mut scene);

        let handle = raster.handle(&tile).unwrap();
        assert_eq!(handle.status, TileStatus::Loaded);
        assert!(scene.image(&tile).unwrap().is_rendered());
        assert_eq!(raster.pending_count(), g.len() - 1);
    }

    #[test]
    fn test_wait_times_out() {
        let mut raster = layer(0);
        let mut scene = SceneGraph::default();
        raster.reconcile(&grid(2048.0, 480.0, 250.0), &mut scene);
        let applied = raster.wait(Duration::from_millis(20), &mut scene);
        assert_eq!(applied, 0);
        assert!(raster.pending_count() > 0);
    }
}
