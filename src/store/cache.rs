//! Bounded cache of built graphs.
//!
//! Graphs are keyed by an identifier chosen by the caller (an application
//! id, a schema version tag). The cache is an explicit object handed to
//! whoever builds graphs, so its lifetime and capacity are the caller's.
//!
//! Entries are `Arc<GraphStore>`: a cached graph is immutable and can be
//! queried from several threads at once.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::GraphStore;

/// Configuration for the graph cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of graphs kept.
    pub max_entries: usize,
    /// Whether to cache at all.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 32,
            enabled: true,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries in the cache.
    pub len: usize,
    /// Maximum capacity of the cache.
    pub cap: usize,
}

/// LRU cache of built graphs keyed by external identifier.
pub struct GraphCache {
    cache: Option<Mutex<LruCache<String, Arc<GraphStore>>>>,
}

impl GraphCache {
    /// Create a cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        let cache = if config.enabled {
            let size = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
            Some(Mutex::new(LruCache::new(size)))
        } else {
            None
        };

        Self { cache }
    }

    /// Fetch a cached graph, marking it most recently used.
    pub fn get(&self, key: &str) -> Option<Arc<GraphStore>> {
        self.cache.as_ref()?.lock().get(key).cloned()
    }

    /// Store a graph, evicting the least recently used one when full.
    ///
    /// Returns the shared handle; with caching disabled the graph is only
    /// wrapped, not stored.
    pub fn insert(&self, key: impl Into<String>, graph: GraphStore) -> Arc<GraphStore> {
        let graph = Arc::new(graph);
        if let Some(cache) = &self.cache {
            cache.lock().put(key.into(), Arc::clone(&graph));
        }
        graph
    }

    /// Return the cached graph for `key`, building and caching it on a miss.
    ///
    /// Build errors are returned as-is and nothing is cached. The build runs
    /// without holding the cache lock.
    pub fn get_or_build<F, E>(&self, key: &str, build: F) -> Result<Arc<GraphStore>, E>
    where
        F: FnOnce() -> Result<GraphStore, E>,
    {
        if let Some(graph) = self.get(key) {
            tracing::trace!(key, "graph cache hit");
            return Ok(graph);
        }

        tracing::debug!(key, "graph cache miss, building");
        let graph = build()?;
        Ok(self.insert(key, graph))
    }

    /// Drop one entry. Returns whether it was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.cache
            .as_ref()
            .is_some_and(|cache| cache.lock().pop(key).is_some())
    }

    /// Clear the cache.
    ///
    /// Does nothing if caching is disabled.
    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().clear();
        }
    }

    /// Get cache statistics.
    ///
    /// Returns `None` if caching is disabled.
    pub fn stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| {
            let cache = cache.lock();
            CacheStats {
                len: cache.len(),
                cap: cache.cap().get(),
            }
        })
    }
}

impl Default for GraphCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeRef;

    fn graph_with(key: &str) -> GraphStore {
        let mut store = GraphStore::new();
        store.add_node(NodeRef::field(key));
        store
    }

    #[test]
    fn test_get_or_build_caches() {
        let cache = GraphCache::default();
        let mut builds = 0;

        for _ in 0..3 {
            let graph = cache
                .get_or_build("app_1", || {
                    builds += 1;
                    Ok::<_, std::convert::Infallible>(graph_with("f"))
                })
                .unwrap();
            assert_eq!(graph.num_nodes(), 1);
        }

        assert_eq!(builds, 1);
        assert_eq!(cache.stats().unwrap().len, 1);
    }

    #[test]
    fn test_build_error_not_cached() {
        let cache = GraphCache::default();
        let result = cache.get_or_build("app_1", || Err::<GraphStore, _>("fetch failed"));
        assert_eq!(result.unwrap_err(), "fetch failed");
        assert!(cache.get("app_1").is_none());
    }

    #[test]
    fn test_lru_eviction() {
        let cache = GraphCache::new(CacheConfig {
            max_entries: 2,
            enabled: true,
        });
        cache.insert("a", graph_with("a"));
        cache.insert("b", graph_with("b"));
        // Touch "a" so "b" becomes least recently used.
        assert!(cache.get("a").is_some());
        cache.insert("c", graph_with("c"));

        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.stats().unwrap(), CacheStats { len: 2, cap: 2 });
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = GraphCache::default();
        cache.insert("a", graph_with("a"));
        cache.insert("b", graph_with("b"));

        assert!(cache.invalidate("a"));
        assert!(!cache.invalidate("a"));
        assert_eq!(cache.stats().unwrap().len, 1);

        cache.clear();
        assert_eq!(cache.stats().unwrap().len, 0);
    }

    #[test]
    fn test_cache_disabled() {
        let cache = GraphCache::new(CacheConfig {
            max_entries: 10,
            enabled: false,
        });
        assert!(cache.stats().is_none());

        let mut builds = 0;
        for _ in 0..2 {
            cache
                .get_or_build("a", || {
                    builds += 1;
                    Ok::<_, std::convert::Infallible>(graph_with("a"))
                })
                .unwrap();
        }
        assert_eq!(builds, 2);
    }
}
