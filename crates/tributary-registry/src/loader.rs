// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lazy, memoized connector instance loader.
//!
//! `get` settles a reference into a cache key (display name to uid,
//! variable to its current value) and returns a cached instance when one
//! exists. `load` resolves the key, awaits the class loader, constructs the
//! instance with the class's convention, and caches it under both the key
//! and the instance uid.

use std::sync::{Arc, Weak};

use futures::FutureExt;
use tracing::{debug, info, warn};
use tributary_core::types::{DEFAULT_MARKER, EXPRESSION_UID};
use tributary_core::{
    ArrayPolicy, ClassLoader, FailureNotifier, Interpolator, ScopedVars, SourceInstance,
    SourceSettings, TributaryError,
};

use crate::cache::{InstanceCache, LoadFailure, LoadResult};
use crate::registry::Registry;
use crate::resolver::Reference;
use crate::state::Generation;

/// Produces connector instances for references within a generation.
#[derive(Clone)]
pub struct InstanceLoader {
    class_loader: Arc<dyn ClassLoader>,
    interpolator: Arc<dyn Interpolator>,
    notifier: Arc<dyn FailureNotifier>,
}

impl InstanceLoader {
    pub fn new(
        class_loader: Arc<dyn ClassLoader>,
        interpolator: Arc<dyn Interpolator>,
        notifier: Arc<dyn FailureNotifier>,
    ) -> Self {
        Self {
            class_loader,
            interpolator,
            notifier,
        }
    }

    /// Return the instance for `reference`, loading it on a cache miss.
    pub async fn get(
        &self,
        generation: Arc<Generation>,
        reference: Reference,
        scope: Option<&ScopedVars>,
    ) -> Result<Arc<SourceInstance>, TributaryError> {
        let registry = generation.registry();

        let (token, is_variable) = match reference {
            Reference::Expression => {
                return generation
                    .cache()
                    .get(EXPRESSION_UID)
                    .ok_or_else(|| TributaryError::NotFound {
                        key: EXPRESSION_UID.to_string(),
                    });
            }
            Reference::Default => (default_key(&generation)?, false),
            Reference::Variable(token) => (token, true),
            Reference::Literal(token) => (token, false),
        };

        // The cache is keyed by uid or loaded token, never by display name.
        let token = match registry.uid_for_name(&token) {
            Some(uid) => uid.to_string(),
            None => token,
        };

        if let Some(instance) = generation.cache().get(&token) {
            debug!(key = %token, "connector cache hit");
            return Ok(instance);
        }

        if !is_variable {
            return self.load(generation, token).await;
        }

        let interpolated = self
            .interpolator
            .interpolate(&token, scope, ArrayPolicy::FirstOfArray);
        let key = if interpolated == DEFAULT_MARKER {
            default_key(&generation)?
        } else {
            interpolated
        };
        debug!(variable = %token, key = %key, "variable reference interpolated");

        if let Some(instance) = generation.cache().get(&key) {
            debug!(key = %key, "connector cache hit");
            return Ok(instance);
        }
        self.load(generation, key).await
    }

    /// Load the instance for an already de-indirected key.
    ///
    /// Concurrent calls for the same key within a generation join one load.
    pub async fn load(
        &self,
        generation: Arc<Generation>,
        key: String,
    ) -> Result<Arc<SourceInstance>, TributaryError> {
        if let Some(instance) = generation.cache().get(&key) {
            return Ok(instance);
        }

        let (pending, started) = generation.cache().join_or_start(&key, || {
            construct(
                PendingContext {
                    version: generation.version(),
                    registry: generation.shared_registry(),
                    cache: generation.weak_cache(),
                },
                self.class_loader.clone(),
                self.notifier.clone(),
                key.clone(),
            )
            .boxed()
            .shared()
        });
        if !started {
            debug!(key = %key, "joining in-flight connector load");
        }

        pending.await.map_err(|failure| failure.into_error(&key))
    }
}

impl std::fmt::Debug for InstanceLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceLoader").finish_non_exhaustive()
    }
}

/// The default identifier translated to a cache key (uid when it is a name).
fn default_key(generation: &Generation) -> Result<String, TributaryError> {
    let registry = generation.registry();
    let key = registry.default_key().ok_or_else(|| TributaryError::NotFound {
        key: DEFAULT_MARKER.to_string(),
    })?;
    Ok(registry.uid_for_name(key).unwrap_or(key).to_string())
}

/// What a pending load keeps of its generation.
///
/// The cache is held weakly; it owns this load through its in-flight map.
struct PendingContext {
    version: u64,
    registry: Arc<Registry>,
    cache: Weak<InstanceCache>,
}

async fn construct(
    context: PendingContext,
    class_loader: Arc<dyn ClassLoader>,
    notifier: Arc<dyn FailureNotifier>,
    key: String,
) -> LoadResult {
    let result = construct_inner(&context, class_loader.as_ref(), notifier.as_ref(), &key).await;
    if let Some(cache) = context.cache.upgrade() {
        cache.finish(&key);
    }
    result
}

async fn construct_inner(
    context: &PendingContext,
    class_loader: &dyn ClassLoader,
    notifier: &dyn FailureNotifier,
    key: &str,
) -> LoadResult {
    let settings = {
        let Some(cache) = context.cache.upgrade() else {
            return Err(LoadFailure::Retired);
        };
        if let Some(instance) = cache.get(key) {
            return Ok(instance);
        }

        let Some(settings) = context.registry.lookup(key).cloned() else {
            warn!(key, "no source registered for key");
            return Err(LoadFailure::Unresolved);
        };

        // A legacy id key may address an instance already cached under its uid.
        if let Some(instance) = cache.get(&settings.uid) {
            cache.insert(key, instance.clone());
            return Ok(instance);
        }
        settings
    };

    let plugin = match class_loader.load_connector_class(&settings.meta).await {
        Ok(plugin) => plugin,
        Err(e) => return Err(report(notifier, &settings, key, &e)),
    };

    let Some(cache) = context.cache.upgrade() else {
        debug!(key, "generation retired while class was loading");
        return Err(LoadFailure::Retired);
    };

    // Another requester may have filled the slot while the class loaded.
    if let Some(instance) = cache.get(key) {
        debug!(key, "connector cached while class was loading; discarding class");
        return Ok(instance);
    }

    let constructed = match plugin.class.construct(&settings) {
        Ok(constructed) => constructed,
        Err(e) => return Err(report(notifier, &settings, key, &e)),
    };

    let instance = Arc::new(
        SourceInstance::build(constructed, &settings).with_components(plugin.components),
    );
    cache.store(key, instance.clone());
    info!(
        key,
        uid = instance.uid(),
        plugin = %settings.meta.id,
        legacy = plugin.class.is_legacy(),
        generation = context.version,
        "connector instance loaded"
    );
    Ok(instance)
}

fn report(
    notifier: &dyn FailureNotifier,
    settings: &SourceSettings,
    key: &str,
    error: &TributaryError,
) -> LoadFailure {
    warn!(key, source = %settings.name, error = %error, "connector load failed");
    notifier.notify_load_failure(&settings.name, &error.to_string());
    LoadFailure::Failed
}
