#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use quakemap::{
    prelude::*,
    tiles::{loader::TileRequest, source::default_basemap},
};

/// Tile fetcher that answers from memory, fails the tiles it is told to and
/// records every request it sees.
#[derive(Default)]
pub struct ScriptedFetcher {
    failing: Vec<TileIndex>,
    delay: Option<Duration>,
    requests: Mutex<Vec<TileIndex>>,
}

impl ScriptedFetcher {
    pub fn failing(tiles: &[TileIndex]) -> Self {
        Self {
            failing: tiles.to_vec(),
            ..Default::default()
        }
    }

    /// Every fetch takes `delay` before answering.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn requests_for(&self, tile: &TileIndex) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.iter().filter(|t| *t == tile).count())
            .unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().map(|requests| requests.len()).unwrap_or(0)
    }
}

impl TileFetcher for ScriptedFetcher {
    fn fetch(&self, request: &TileRequest) -> Result<Vec<u8>> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.tile);
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.failing.contains(&request.tile) {
            return Err(MapError::tile(request.tile, "HTTP 404 Not Found"));
        }
        Ok(format!("png:{}", request.tile).into_bytes())
    }
}

pub fn controller_with(fetcher: Arc<ScriptedFetcher>) -> InteractionController<SceneGraph> {
    InteractionController::new(
        MapConfig::default(),
        SceneGraph::default(),
        Box::new(default_basemap()),
        fetcher,
    )
    .expect("controller")
}

pub fn controller() -> InteractionController<SceneGraph> {
    controller_with(Arc::new(ScriptedFetcher::default()))
}

pub fn quake(id: &str, lng: f64, lat: f64, mag: f64) -> GeoPoint {
    let mut point = GeoPoint::new(LngLat::new(lng, lat), mag);
    point.id = Some(id.to_string());
    point
}
