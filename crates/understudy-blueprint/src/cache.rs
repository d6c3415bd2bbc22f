//! Process-wide blueprint cache
//!
//! Shapes are compiled once per target type (and per protected-method
//! setting, which changes the slot table) and shared afterwards.

use crate::blueprint::Blueprint;
use crate::config::DoubleConfig;
use crate::error::BlueprintError;
use crate::shape::TypeShape;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::sync::Arc;

static GLOBAL: Lazy<BlueprintCache> = Lazy::new(BlueprintCache::new);

/// Cache of compiled blueprints keyed by target type
///
/// Thread-safe: tests running in parallel share the global instance.
#[derive(Debug, Default)]
pub struct BlueprintCache {
    entries: DashMap<(TypeId, bool), Arc<Blueprint>>,
}

impl BlueprintCache {
    /// Create empty cache
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Shared process-wide cache
    #[inline]
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Fetch the blueprint of `T`, compiling `shape()` on first use
    ///
    /// # Errors
    /// Propagates [`Blueprint::compile`] errors; failed compilations are not cached
    pub fn get_or_compile<T: 'static>(
        &self,
        config: &DoubleConfig,
        shape: impl FnOnce() -> TypeShape,
    ) -> Result<Arc<Blueprint>, BlueprintError> {
        let key = (TypeId::of::<T>(), config.allow_protected_methods);
        if let Some(found) = self.entries.get(&key) {
            return Ok(Arc::clone(found.value()));
        }

        // Compile outside the shard lock; a racing insert wins and ours is dropped.
        let compiled = Arc::new(Blueprint::compile(shape(), config)?);
        let entry = self.entries.entry(key).or_insert(compiled);
        Ok(Arc::clone(entry.value()))
    }

    /// Number of cached blueprints
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
