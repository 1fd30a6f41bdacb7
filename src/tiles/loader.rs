use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::{
    core::{config::TileLoadingConfig, geo::TileIndex},
    MapError, Result,
};

/// One outstanding tile download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileRequest {
    pub tile: TileIndex,
    pub url: String,
    /// Identifies the display handle that asked for the tile; completions
    /// whose ticket no longer matches are discarded.
    pub ticket: u64,
}

/// Result of a tile loading operation
#[derive(Debug)]
pub struct TileLoadResult {
    pub tile: TileIndex,
    pub ticket: u64,
    pub data: Result<Vec<u8>>,
}

/// Blocking transport for tile bytes. Runs on loader worker threads.
pub trait TileFetcher: Send + Sync + 'static {
    fn fetch(&self, request: &TileRequest) -> Result<Vec<u8>>;
}

/// Fetches tiles over HTTP(S) with a blocking reqwest client.
pub struct HttpTileFetcher {
    client: reqwest::blocking::Client,
}

impl HttpTileFetcher {
    pub fn new(config: &TileLoadingConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { client })
    }
}

impl TileFetcher for HttpTileFetcher {
    fn fetch(&self, request: &TileRequest) -> Result<Vec<u8>> {
        log::debug!("fetch tile {} from {}", request.tile, request.url);
        let resp = self
            .client
            .get(&request.url)
            .send()
            .map_err(|e| MapError::tile(request.tile, e))?;
        if !resp.status().is_success() {
            return Err(MapError::tile(request.tile, format!("HTTP {}", resp.status())));
        }
        let bytes = resp.bytes().map_err(|e| MapError::tile(request.tile, e))?;
        Ok(bytes.to_vec())
    }
}

/// Tile loader that fetches tiles on a small pool of worker threads and
/// reports completions over a channel. Completions are consumed on the
/// caller's thread, so layer state is never touched concurrently.
pub struct TileLoader {
    request_tx: Sender<TileRequest>,
    result_rx: Receiver<TileLoadResult>,
    workers: usize,
}

impl TileLoader {
    pub fn new(fetcher: Arc<dyn TileFetcher>, workers: usize) -> Result<Self> {
        let (request_tx, request_rx) = unbounded::<TileRequest>();
        let (result_tx, result_rx) = unbounded::<TileLoadResult>();
        let workers = workers.max(1);

        for worker in 0..workers {
            let requests = request_rx.clone();
            let results = result_tx.clone();
            let fetcher = Arc::clone(&fetcher);

            thread::Builder::new()
                .name(format!("tile-worker-{}", worker))
                .spawn(move || {
                    for request in requests.iter() {
                        let data = fetcher.fetch(&request);
                        let result = TileLoadResult {
                            tile: request.tile,
                            ticket: request.ticket,
                            data,
                        };
                        if results.send(result).is_err() {
                            log::debug!("tile worker {} exiting - loader dropped", worker);
                            break;
                        }
                    }
                })?;
        }

        Ok(Self {
            request_tx,
            result_rx,
            workers,
        })
    }

    pub fn with_config(fetcher: Arc<dyn TileFetcher>, config: &TileLoadingConfig) -> Result<Self> {
        Self::new(fetcher, config.workers)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queues a download. Never blocks.
    pub fn request(&self, request: TileRequest) {
        let tile = request.tile;
        if self.request_tx.send(request).is_err() {
            log::warn!("tile workers gone, dropping request for {}", tile);
        }
    }

    /// Drains every completion that is ready right now.
    pub fn try_recv_results(&self) -> Vec<TileLoadResult> {
        self.result_rx.try_iter().collect()
    }

    /// Waits up to `timeout` for the next completion.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<TileLoadResult> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl std::fmt::Debug for TileLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileLoader")
            .field("workers", &self.workers)
            .field("queued", &self.request_tx.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoFetcher;

    impl TileFetcher for EchoFetcher {
        fn fetch(&self, request: &TileRequest) -> Result<Vec<u8>> {
            if request.tile.x == 13 {
                return Err(MapError::tile(request.tile, "unlucky"));
            }
            Ok(request.url.as_bytes().to_vec())
        }
    }

    fn request(x: u32, ticket: u64) -> TileRequest {
        TileRequest {
            tile: TileIndex::new(x, 0, 4),
            url: format!("tile-{}", x),
            ticket,
        }
    }

    #[test]
    fn test_results_come_back() {
        let loader = TileLoader::new(Arc::new(EchoFetcher), 2).unwrap();
        loader.request(request(1, 10));
        loader.request(request(13, 11));

        let mut results = Vec::new();
        while results.len() < 2 {
            let result = loader
                .recv_timeout(Duration::from_secs(5))
                .expect("tile result");
            results.push(result);
        }
        results.sort_by_key(|r| r.ticket);

        assert_eq!(results[0].tile.x, 1);
        assert_eq!(results[0].data.as_ref().unwrap(), b"tile-1");
        assert!(matches!(results[1].data, Err(MapError::TileLoad { .. })));
        assert!(loader.try_recv_results().is_empty());
    }

    #[test]
    fn test_http_failures_are_tile_errors() {
        let fetcher = HttpTileFetcher::new(&TileLoadingConfig::default()).unwrap();
        let err = fetcher.fetch(&request(3, 1)).unwrap_err();
        assert!(matches!(err, MapError::TileLoad { tile, .. } if tile.x == 3));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_at_least_one_worker() {
        let loader = TileLoader::new(Arc::new(EchoFetcher), 0).unwrap();
        assert_eq!(loader.workers(), 1);
    }
}
