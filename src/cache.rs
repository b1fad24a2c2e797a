// Copyright 2025 Cowboy AI, LLC.

//! Caller-owned memoization of compositions
//!
//! Composition is deterministic, so identical inputs may share one result.
//! The cache is keyed by a fingerprint of the base object, the ordered trait
//! definitions and the compose options. Failed compositions are not cached.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::composed::ComposedObject;
use crate::compositor::{compose, ComposeOptions};
use crate::definition::{BaseObjectDefinition, TraitDefinition};
use crate::errors::ComposeResult;

/// Cache sizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Maximum number of compositions kept
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 128 }
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that had to compose
    pub misses: u64,
    /// Entries currently held
    pub entries: usize,
}

#[derive(Debug)]
struct Inner {
    entries: LruCache<String, Arc<ComposedObject>>,
    hits: u64,
    misses: u64,
}

/// LRU cache of composed objects
#[derive(Debug)]
pub struct CompositionCache {
    inner: Mutex<Inner>,
}

impl Default for CompositionCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl CompositionCache {
    /// Create a cache; a zero capacity is raised to one
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Return the cached composition for these inputs, composing on a miss
    pub fn get_or_compose(
        &self,
        traits: &[TraitDefinition],
        base: &BaseObjectDefinition,
        options: ComposeOptions,
    ) -> ComposeResult<Arc<ComposedObject>> {
        let Some(key) = fingerprint(traits, base, options) else {
            return compose(traits, base, options).map(Arc::new);
        };

        {
            let mut inner = self.lock();
            if let Some(hit) = inner.entries.get(&key).cloned() {
                inner.hits += 1;
                debug!(object = %base.id, "Composition cache hit");
                return Ok(hit);
            }
        }

        let composed = Arc::new(compose(traits, base, options)?);
        let mut inner = self.lock();
        inner.misses += 1;
        inner.entries.put(key, Arc::clone(&composed));
        debug!(object = %base.id, entries = inner.entries.len(), "Composition cached");
        Ok(composed)
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.entries.len(),
        }
    }

    /// Drop every entry, keeping the counters
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn fingerprint(
    traits: &[TraitDefinition],
    base: &BaseObjectDefinition,
    options: ComposeOptions,
) -> Option<String> {
    match serde_json::to_string(&(base, traits, options)) {
        Ok(key) => Some(key),
        Err(error) => {
            warn!(object = %base.id, %error, "Could not fingerprint composition inputs, bypassing cache");
            None
        }
    }
}
