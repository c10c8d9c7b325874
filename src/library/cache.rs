//! Compilation Cache
//!
//! Content-addressed store of fully compiled units. Keys are xxh3-128 hashes
//! of the **raw** (pre-include) source, optionally seeded with a hash of the
//! active defines (see [`CacheKeyPolicy`]). Values are shared `Arc<str>`s, so
//! a cache hit hands back the very same allocation as the original compile.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::{xxh3_128, xxh3_128_with_seed};

use super::settings::CacheKeyPolicy;
use crate::preprocessor::ShaderDefines;

/// Hit / miss counters since creation (or the last [`CompilationCache::clear`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct CompilationCache {
    entries: FxHashMap<u128, Arc<str>>,
    stats: CacheStats,
}

impl CompilationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw-source content hash.
    #[inline]
    #[must_use]
    pub fn hash(source: &str) -> u128 {
        xxh3_128(source.as_bytes())
    }

    /// Cache key for `source` under `policy`.
    #[must_use]
    pub fn key(policy: CacheKeyPolicy, source: &str, defines: &ShaderDefines) -> u128 {
        match policy {
            CacheKeyPolicy::Source => Self::hash(source),
            CacheKeyPolicy::SourceAndDefines => {
                xxh3_128_with_seed(source.as_bytes(), defines.compute_hash())
            }
        }
    }

    /// Looks up a compiled unit, recording a hit or a miss.
    pub fn lookup(&mut self, key: u128) -> Option<Arc<str>> {
        let found = self.entries.get(&key).cloned();
        if found.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    #[must_use]
    pub fn contains(&self, key: u128) -> bool {
        self.entries.contains_key(&key)
    }

    /// Stores a compiled unit and returns the shared handle.
    pub fn insert(&mut self, key: u128, compiled: String) -> Arc<str> {
        let compiled: Arc<str> = Arc::from(compiled);
        self.entries.insert(key, Arc::clone(&compiled));
        compiled
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }
}
