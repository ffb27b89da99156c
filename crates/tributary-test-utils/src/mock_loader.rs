// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock class loader and test connectors.
//!
//! `MockClassLoader` serves pre-registered plugins by plugin id, counts how
//! often each plugin is loaded, and can delay or fail loads so tests can
//! exercise the loader's suspension points.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tributary_core::{
    ClassLoader, Connector, ConnectorFactory, Constructed, InjectionContext,
    LegacyConnectorFactory, LoadedPlugin, PluginMeta, SourceSettings, TributaryError,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Connector that records the settings it was constructed from.
#[derive(Debug)]
pub struct TestConnector {
    settings: SourceSettings,
    /// Which construction convention produced this instance.
    pub legacy: bool,
}

impl TestConnector {
    pub fn new(settings: SourceSettings) -> Self {
        Self {
            settings,
            legacy: false,
        }
    }

    pub fn settings(&self) -> &SourceSettings {
        &self.settings
    }
}

impl Connector for TestConnector {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn id(&self) -> Option<i64> {
        self.settings.id
    }

    fn source_type(&self) -> &str {
        &self.settings.source_type
    }

    fn meta(&self) -> &PluginMeta {
        &self.settings.meta
    }

    fn uid(&self) -> &str {
        &self.settings.uid
    }
}

/// An old-style connector object with no capability set of its own.
#[derive(Debug)]
pub struct BareConnector {
    pub url: Option<String>,
}

/// What a factory should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryOutput {
    Conforming,
    Bare,
    Fail,
}

/// Factory usable with both construction conventions; counts constructions.
#[derive(Debug)]
pub struct TestFactory {
    output: FactoryOutput,
    constructed: AtomicUsize,
}

impl TestFactory {
    pub fn new(output: FactoryOutput) -> Self {
        Self {
            output,
            constructed: AtomicUsize::new(0),
        }
    }

    /// Number of construction attempts.
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    fn produce(&self, settings: &SourceSettings, legacy: bool) -> Result<Constructed, TributaryError> {
        self.constructed.fetch_add(1, Ordering::SeqCst);
        match self.output {
            FactoryOutput::Conforming => Ok(Constructed::Conforming(Box::new(TestConnector {
                settings: settings.clone(),
                legacy,
            }))),
            FactoryOutput::Bare => Ok(Constructed::Bare(Box::new(BareConnector {
                url: settings.url.clone(),
            }))),
            FactoryOutput::Fail => Err(TributaryError::plugin(format!(
                "constructor for {} threw",
                settings.source_type
            ))),
        }
    }
}

impl ConnectorFactory for TestFactory {
    fn create(&self, settings: SourceSettings) -> Result<Constructed, TributaryError> {
        self.produce(&settings, false)
    }
}

impl LegacyConnectorFactory for TestFactory {
    fn instantiate(&self, injector: &InjectionContext) -> Result<Constructed, TributaryError> {
        let settings = injector
            .instance_settings()
            .ok_or_else(|| TributaryError::plugin("instance_settings slot missing"))?;
        self.produce(settings, true)
    }
}

enum PluginBehavior {
    Load(LoadedPlugin),
    Fail(String),
}

/// A mock class loader keyed by plugin id.
pub struct MockClassLoader {
    plugins: Mutex<HashMap<String, PluginBehavior>>,
    loads: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl MockClassLoader {
    pub fn new() -> Self {
        Self {
            plugins: Mutex::new(HashMap::new()),
            loads: Mutex::new(HashMap::new()),
            total: AtomicUsize::new(0),
            delay: Mutex::new(None),
        }
    }

    /// Register a plugin whose class is constructed directly from settings.
    pub fn with_modern(self, plugin_id: &str, factory: Arc<TestFactory>) -> Self {
        self.register(plugin_id, LoadedPlugin::modern(factory));
        self
    }

    /// Register a plugin that uses injected construction.
    pub fn with_legacy(self, plugin_id: &str, factory: Arc<TestFactory>) -> Self {
        self.register(plugin_id, LoadedPlugin::legacy(factory));
        self
    }

    /// Register a plugin whose bundle fails to load.
    pub fn with_failure(self, plugin_id: &str, message: &str) -> Self {
        lock(&self.plugins)
            .insert(plugin_id.to_string(), PluginBehavior::Fail(message.to_string()));
        self
    }

    /// Delay every load by `delay` before returning.
    pub fn with_delay(self, delay: Duration) -> Self {
        *lock(&self.delay) = Some(delay);
        self
    }

    pub fn register(&self, plugin_id: &str, plugin: LoadedPlugin) {
        lock(&self.plugins)
            .insert(plugin_id.to_string(), PluginBehavior::Load(plugin));
    }

    /// Total number of `load_connector_class` calls.
    pub fn total_loads(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Number of loads for one plugin id.
    pub fn loads_of(&self, plugin_id: &str) -> usize {
        lock(&self.loads)
            .get(plugin_id)
            .copied()
            .unwrap_or(0)
    }
}

impl Default for MockClassLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClassLoader for MockClassLoader {
    async fn load_connector_class(&self, meta: &PluginMeta) -> Result<LoadedPlugin, TributaryError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *lock(&self.loads).entry(meta.id.clone()).or_default() += 1;

        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match lock(&self.plugins).get(&meta.id) {
            Some(PluginBehavior::Load(plugin)) => Ok(plugin.clone()),
            Some(PluginBehavior::Fail(message)) => Err(TributaryError::plugin(message.clone())),
            None => Err(TributaryError::plugin(format!("no plugin bundle for {}", meta.id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_registered_plugins_and_counts_loads() {
        let factory = Arc::new(TestFactory::new(FactoryOutput::Conforming));
        let loader = MockClassLoader::new().with_modern("prometheus", factory);

        let plugin = loader
            .load_connector_class(&PluginMeta::new("prometheus"))
            .await
            .unwrap();
        assert!(!plugin.class.is_legacy());
        assert_eq!(loader.loads_of("prometheus"), 1);

        let missing = loader.load_connector_class(&PluginMeta::new("loki")).await;
        assert!(missing.is_err());
        assert_eq!(loader.total_loads(), 2);
    }

    #[tokio::test]
    async fn failure_plugins_return_errors() {
        let loader = MockClassLoader::new().with_failure("broken", "bundle 404");
        let err = loader
            .load_connector_class(&PluginMeta::new("broken"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bundle 404"));
    }

    #[test]
    fn legacy_factory_reads_instance_settings_slot() {
        let factory = TestFactory::new(FactoryOutput::Conforming);
        let settings = SourceSettings::new("A", "uidA", "graphite");
        let constructed = factory
            .instantiate(&InjectionContext::with_instance_settings(settings))
            .unwrap();
        match constructed {
            Constructed::Conforming(connector) => assert_eq!(connector.uid(), "uidA"),
            Constructed::Bare(_) => panic!("expected conforming connector"),
        }
        assert_eq!(factory.constructed(), 1);
    }
}
