use crate::core::geo::TileIndex;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// In-memory cache of fetched tile bytes using LRU eviction.
///
/// Only successful downloads are stored, so a failed tile is always
/// requested again the next time it becomes visible.
#[derive(Debug)]
pub struct TileCache {
    cache: Option<LruCache<TileIndex, Arc<Vec<u8>>>>,
}

impl TileCache {
    /// Create a new tile cache with the given capacity; 0 disables caching
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(LruCache::new),
        }
    }

    pub fn disabled() -> Self {
        Self { cache: None }
    }

    /// Get a tile from the cache
    pub fn get(&mut self, tile: &TileIndex) -> Option<Arc<Vec<u8>>> {
        self.cache.as_mut()?.get(tile).cloned()
    }

    /// Insert a tile into the cache
    pub fn put(&mut self, tile: TileIndex, data: Arc<Vec<u8>>) {
        if let Some(cache) = self.cache.as_mut() {
            cache.put(tile, data);
        }
    }

    /// Check if a tile is in the cache
    pub fn contains(&self, tile: &TileIndex) -> bool {
        self.cache.as_ref().map(|cache| cache.contains(tile)).unwrap_or(false)
    }

    /// Clear all tiles from the cache
    pub fn clear(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }

    /// Get the current number of cached tiles
    pub fn len(&self) -> usize {
        self.cache.as_ref().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.cache.as_ref().map(|cache| cache.cap().get()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eviction() {
        let mut cache = TileCache::new(2);
        let a = TileIndex::new(0, 0, 1);
        let b = TileIndex::new(1, 0, 1);
        let c = TileIndex::new(0, 1, 1);

        cache.put(a, Arc::new(vec![1]));
        cache.put(b, Arc::new(vec![2]));
        assert!(cache.get(&a).is_some()); // a is now most recent
        cache.put(c, Arc::new(vec![3]));

        assert!(cache.contains(&a));
        assert!(!cache.contains(&b));
        assert!(cache.contains(&c));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn test_disabled_cache() {
        let mut cache = TileCache::new(0);
        cache.put(TileIndex::new(0, 0, 0), Arc::new(vec![1]));
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), 0);
        assert!(TileCache::disabled().get(&TileIndex::new(0, 0, 0)).is_none());
    }
}
