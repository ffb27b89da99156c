// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned resolver state.
//!
//! A [`Generation`] pairs one [`Registry`] with its own [`InstanceCache`].
//! [`ResolverState`] publishes generations through `ArcSwap`, so readers
//! always see a complete registry and a cache built from it.

use std::sync::{Arc, Mutex, PoisonError, Weak};

use arc_swap::ArcSwap;
use tracing::debug;
use tributary_core::builtin::expression_instance;
use tributary_core::types::{EXPRESSION_LEGACY_UID, EXPRESSION_UID};
use tributary_core::{SourceInstance, TributaryError};

use crate::cache::InstanceCache;
use crate::registry::Registry;

/// One registry snapshot and the instances loaded from it.
#[derive(Debug)]
pub struct Generation {
    version: u64,
    registry: Arc<Registry>,
    cache: Arc<InstanceCache>,
}

impl Generation {
    /// A new generation with an empty cache, apart from the expression
    /// instance which is pre-populated under both of its uids.
    pub fn new(version: u64, registry: Registry) -> Self {
        let cache = InstanceCache::new();
        let expression = expression_instance();
        cache.insert(EXPRESSION_UID, expression.clone());
        cache.insert(EXPRESSION_LEGACY_UID, expression);
        Self {
            version,
            registry: Arc::new(registry),
            cache: Arc::new(cache),
        }
    }

    /// Same cache, extended registry. Used for runtime registration, which
    /// adds to the current generation rather than starting a new one.
    fn extend(&self, registry: Registry) -> Self {
        Self {
            version: self.version,
            registry: Arc::new(registry),
            cache: self.cache.clone(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn cache(&self) -> &InstanceCache {
        &self.cache
    }

    pub(crate) fn shared_registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub(crate) fn weak_cache(&self) -> Weak<InstanceCache> {
        Arc::downgrade(&self.cache)
    }
}

/// Holder of the current generation.
///
/// Reads are lock-free. Writers (`replace`, `extend`) are serialized so a
/// runtime registration cannot be lost to a concurrent `init`.
pub struct ResolverState {
    current: ArcSwap<Generation>,
    writer: Mutex<()>,
}

impl ResolverState {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(Generation::new(0, Registry::default())),
            writer: Mutex::new(()),
        }
    }

    pub fn current(&self) -> Arc<Generation> {
        self.current.load_full()
    }

    /// Publish a new generation built from `registry`; the previous cache is
    /// dropped with the previous generation. `preload` instances are cached
    /// under their keys before the generation becomes visible.
    pub fn replace(
        &self,
        registry: Registry,
        preload: impl IntoIterator<Item = (String, Arc<SourceInstance>)>,
    ) -> Arc<Generation> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let version = self.current.load().version + 1;
        let next = Generation::new(version, registry);
        for (key, instance) in preload {
            next.cache.store(&key, instance);
        }
        let next = Arc::new(next);
        self.current.store(next.clone());
        debug!(version, sources = next.registry.len(), "published registry generation");
        next
    }

    /// Publish an extended registry that keeps the current cache.
    pub fn extend(
        &self,
        update: impl FnOnce(&Registry) -> Result<Registry, TributaryError>,
    ) -> Result<Arc<Generation>, TributaryError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.current.load_full();
        let next = Arc::new(current.extend(update(current.registry())?));
        self.current.store(next.clone());
        Ok(next)
    }
}

impl Default for ResolverState {
    fn default() -> Self {
        Self::new()
    }
}
