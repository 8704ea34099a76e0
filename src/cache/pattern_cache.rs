use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::reference::{Boundary, BoundaryPattern};

/// Thread-safe LRU cache of compiled reference patterns
///
/// The same absolute spelling is tested against every asset in the pool, so
/// each `(spelling, boundary)` pair is compiled once and shared.
/// Uses LRU eviction policy to maintain bounded memory usage.
pub struct PatternCache {
    cache: Mutex<LruCache<(String, Boundary), Arc<BoundaryPattern>>>,
}

impl PatternCache {
    /// Create a new pattern cache holding at most `capacity` patterns
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Fetch the compiled pattern for a spelling, compiling it on a miss
    pub fn get_or_compile(&self, literal: &str, boundary: Boundary) -> Result<Arc<BoundaryPattern>> {
        let key = (literal.to_string(), boundary);
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pattern) = cache.get(&key) {
            return Ok(Arc::clone(pattern));
        }

        let pattern = Arc::new(BoundaryPattern::compile(literal, boundary)?);
        cache.put(key, Arc::clone(&pattern));
        Ok(pattern)
    }

    /// Get the current number of cached patterns
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
