//! LRU cache of query embeddings.
//!
//! Keyed by the normalized role, so `"Senior Rust Engineer"` and
//! `"rust engineer"` share an entry. The cache is cleared whenever the index
//! is refreshed because a re-embed may swap the underlying model.
//!
//! Each clear starts a new generation. A caller that embeds on a miss takes
//! the generation first and stores with [`QueryEmbeddingCache::put_if_current`],
//! so an embedding computed before a clear is never cached after it.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;

/// Default number of cached query embeddings.
pub const DEFAULT_QUERY_EMBEDDING_CACHE_SIZE: usize = 256;

/// Cache statistics for monitoring and tuning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct Entries {
    lru: LruCache<String, Arc<Vec<f32>>>,
    generation: u64,
}

pub struct QueryEmbeddingCache {
    entries: Mutex<Entries>,
    stats: Mutex<CacheStats>,
}

impl Default for QueryEmbeddingCache {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_EMBEDDING_CACHE_SIZE)
    }
}

impl QueryEmbeddingCache {
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(Entries {
                lru: LruCache::new(capacity),
                generation: 0,
            }),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<Vec<f32>>> {
        let hit = self.entries.lock().lru.get(key).cloned();
        let mut stats = self.stats.lock();
        if hit.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        hit
    }

    pub fn put(&self, key: impl Into<String>, embedding: Arc<Vec<f32>>) {
        self.entries.lock().lru.put(key.into(), embedding);
    }

    /// The current generation; bumped by every [`clear`](Self::clear).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.entries.lock().generation
    }

    /// Store `embedding` only if no clear happened since `generation` was read.
    pub fn put_if_current(&self, key: impl Into<String>, embedding: Arc<Vec<f32>>, generation: u64) -> bool {
        let mut entries = self.entries.lock();
        if entries.generation != generation {
            return false;
        }
        entries.lru.put(key.into(), embedding);
        true
    }

    /// Drop every entry and start a new generation; hit and miss counters are kept.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.lru.clear();
        entries.generation += 1;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().lru.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().lru.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().clone();
        stats.entries = self.len();
        stats
    }
}
