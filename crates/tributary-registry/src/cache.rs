// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation-scoped connector instance cache.
//!
//! Completed instances are memoized by lookup key. Loads that are still
//! running are tracked per key so concurrent requesters join the same load
//! instead of constructing duplicates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, Shared};
use tributary_core::{SourceInstance, TributaryError};

/// Why a load produced no instance. Cloneable so it can be shared between
/// joined requesters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadFailure {
    /// The key did not resolve to any settings.
    Unresolved,
    /// Class loading or construction failed; detail went to the notifier.
    Failed,
    /// The generation was dropped before the load could finish.
    Retired,
}

impl LoadFailure {
    pub(crate) fn into_error(self, key: &str) -> TributaryError {
        match self {
            LoadFailure::Unresolved | LoadFailure::Retired => TributaryError::NotFound {
                key: key.to_string(),
            },
            LoadFailure::Failed => TributaryError::LoadFailed {
                key: key.to_string(),
            },
        }
    }
}

pub(crate) type LoadResult = Result<Arc<SourceInstance>, LoadFailure>;
pub(crate) type PendingLoad = Shared<BoxFuture<'static, LoadResult>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Instance cache for one registry generation.
#[derive(Default)]
pub struct InstanceCache {
    instances: Mutex<HashMap<String, Arc<SourceInstance>>>,
    in_flight: Mutex<HashMap<String, PendingLoad>>,
}

impl InstanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<SourceInstance>> {
        lock(&self.instances).get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.instances).contains_key(key)
    }

    /// Store an instance under a single key.
    pub fn insert(&self, key: impl Into<String>, instance: Arc<SourceInstance>) {
        lock(&self.instances).insert(key.into(), instance);
    }

    /// Store an instance under the lookup key and under its own uid.
    /// Last write wins.
    pub fn store(&self, key: &str, instance: Arc<SourceInstance>) {
        let mut instances = lock(&self.instances);
        instances.insert(instance.uid().to_string(), instance.clone());
        instances.insert(key.to_string(), instance);
    }

    /// Number of cache keys (an instance stored under two keys counts twice).
    pub fn len(&self) -> usize {
        lock(&self.instances).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.instances).is_empty()
    }

    /// Number of loads currently in flight.
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Returns the pending load for `key`, starting one with `start` if none
    /// is running.
    pub(crate) fn join_or_start(
        &self,
        key: &str,
        start: impl FnOnce() -> PendingLoad,
    ) -> (PendingLoad, bool) {
        let mut in_flight = lock(&self.in_flight);
        if let Some(pending) = in_flight.get(key) {
            return (pending.clone(), false);
        }
        let pending = start();
        in_flight.insert(key.to_string(), pending.clone());
        (pending, true)
    }

    /// Drops the in-flight marker for `key`. Called by the load itself once
    /// the outcome is final, after any cache write.
    pub(crate) fn finish(&self, key: &str) {
        lock(&self.in_flight).remove(key);
    }
}

impl std::fmt::Debug for InstanceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceCache")
            .field("instances", &self.len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use tributary_core::builtin::ExpressionConnector;

    use super::*;

    fn instance() -> Arc<SourceInstance> {
        Arc::new(SourceInstance::new(Box::new(ExpressionConnector::new())))
    }

    #[test]
    fn store_indexes_key_and_uid() {
        let cache = InstanceCache::new();
        let instance = instance();
        cache.store("Expression", instance.clone());

        assert!(Arc::ptr_eq(&cache.get("Expression").unwrap(), &instance));
        assert!(Arc::ptr_eq(&cache.get("__expr__").unwrap(), &instance));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn store_is_last_write_wins() {
        let cache = InstanceCache::new();
        let first = instance();
        let second = instance();
        cache.store("k", first);
        cache.store("k", second.clone());
        assert!(Arc::ptr_eq(&cache.get("k").unwrap(), &second));
    }

    #[tokio::test]
    async fn join_or_start_shares_pending_loads() {
        let cache = InstanceCache::new();
        let shared = instance();
        let expected = shared.clone();

        let (first, started) = cache.join_or_start("k", || {
            async move { Ok(shared) }.boxed().shared()
        });
        assert!(started);
        let (second, started) = cache.join_or_start("k", || unreachable!("load already running"));
        assert!(!started);
        assert_eq!(cache.in_flight(), 1);

        let a = first.await.unwrap();
        let b = second.await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &expected));

        cache.finish("k");
        assert_eq!(cache.in_flight(), 0);
    }

    #[test]
    fn failures_map_to_not_found_messages() {
        assert!(matches!(
            LoadFailure::Unresolved.into_error("x"),
            TributaryError::NotFound { key } if key == "x"
        ));
        assert_eq!(LoadFailure::Failed.into_error("x").to_string(), "x was not found");
    }
}
