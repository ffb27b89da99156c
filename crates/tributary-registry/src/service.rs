// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The source service: the public surface over registry, resolver, loader,
//! and listing.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};
use tributary_core::{
    ClassLoader, Connector, FailureNotifier, Interpolator, NoVariables, PassthroughInterpolator,
    ScopedVars, SettingsFetcher, SettingsPayload, SourceInstance, SourceLookup, SourceSettings,
    TracingNotifier, TributaryError, VariableSource,
};

use crate::list::{self, ListFilters};
use crate::loader::InstanceLoader;
use crate::registry::Registry;
use crate::resolver::{self, Reference};
use crate::state::{Generation, ResolverState};

/// A source registered in-process together with its live instance.
struct RuntimeSource {
    settings: SourceSettings,
    instance: Arc<SourceInstance>,
}

/// Resolves source references and hands out memoized connector instances.
pub struct SourceService {
    state: ResolverState,
    loader: InstanceLoader,
    interpolator: Arc<dyn Interpolator>,
    variables: Arc<dyn VariableSource>,
    fetcher: Option<Arc<dyn SettingsFetcher>>,
    runtime: Mutex<Vec<RuntimeSource>>,
}

impl SourceService {
    /// Start building a service around the given class loader.
    pub fn builder(class_loader: Arc<dyn ClassLoader>) -> SourceServiceBuilder {
        SourceServiceBuilder {
            class_loader,
            interpolator: Arc::new(PassthroughInterpolator),
            variables: Arc::new(NoVariables),
            fetcher: None,
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Replace the registry with a new generation and clear the instance cache.
    ///
    /// Runtime-registered sources are carried into the new generation unless
    /// it already has a source with the same uid, name or legacy id.
    pub fn init(
        &self,
        sources: impl IntoIterator<Item = SourceSettings>,
        default_source: impl Into<String>,
    ) {
        let mut registry = Registry::new(sources, default_source);
        let runtime = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);
        let mut carried = Vec::new();
        for source in runtime.iter() {
            match registry.with_source(source.settings.clone()) {
                Ok(next) => {
                    registry = next;
                    carried.push((source.settings.uid.clone(), source.instance.clone()));
                }
                Err(error) => {
                    warn!(
                        uid = %source.settings.uid,
                        name = %source.settings.name,
                        %error,
                        "runtime source shadowed by registry payload"
                    );
                }
            }
        }

        let generation = self.state.replace(registry, carried);
        info!(
            generation = generation.version(),
            sources = generation.registry().len(),
            default = generation.registry().default_source(),
            "source registry initialized"
        );
    }

    /// [`init`](Self::init) from a settings payload.
    pub fn init_payload(&self, payload: SettingsPayload) {
        self.init(payload.sources, payload.default_source);
    }

    /// Re-fetch the settings payload and re-initialize from it.
    pub async fn reload(&self) -> Result<(), TributaryError> {
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or_else(|| TributaryError::Fetch("no settings fetcher configured".to_string()))?;
        let payload = fetcher.fetch_settings().await?;
        self.init_payload(payload);
        Ok(())
    }

    /// Resolve a reference to its settings record, or `None` if unresolved.
    pub fn get_instance_settings(
        &self,
        lookup: Option<&SourceLookup>,
        scope: Option<&ScopedVars>,
    ) -> Option<SourceSettings> {
        let generation = self.state.current();
        resolver::resolve(
            generation.registry(),
            self.interpolator.as_ref(),
            &Reference::normalize(lookup),
            scope,
        )
    }

    /// Return the connector instance for a reference, loading it if needed.
    pub async fn get(
        &self,
        lookup: Option<&SourceLookup>,
        scope: Option<&ScopedVars>,
    ) -> Result<Arc<SourceInstance>, TributaryError> {
        let generation = self.state.current();
        self.loader
            .get(generation, Reference::normalize(lookup), scope)
            .await
    }

    /// All registered settings in generation order.
    pub fn get_all(&self) -> Vec<SourceSettings> {
        self.state.current().registry().get_all().cloned().collect()
    }

    /// Sources matching `filters`, sorted for display.
    pub fn list(&self, filters: &ListFilters) -> Vec<SourceSettings> {
        let generation = self.state.current();
        list::list(generation.registry(), self.variables.as_ref(), filters)
    }

    /// Register a source whose connector is created in-process.
    ///
    /// The instance is cached immediately and no class load ever happens for
    /// it. Fails if the uid, name or legacy id is already registered.
    pub fn register_runtime_source(
        &self,
        settings: SourceSettings,
        connector: Box<dyn Connector>,
    ) -> Result<Arc<SourceInstance>, TributaryError> {
        let mut runtime = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);
        let mut settings = settings;
        if settings.uid.is_empty() {
            settings.uid = settings.name.clone();
        }

        let generation = self
            .state
            .extend(|registry| registry.with_source(settings.clone()))?;
        let instance = Arc::new(SourceInstance::new(connector));
        generation.cache().store(&settings.uid, instance.clone());
        info!(uid = %settings.uid, name = %settings.name, "runtime source registered");

        runtime.push(RuntimeSource {
            settings,
            instance: instance.clone(),
        });
        Ok(instance)
    }

    /// The currently published generation.
    pub fn generation(&self) -> Arc<Generation> {
        self.state.current()
    }
}

impl std::fmt::Debug for SourceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let generation = self.state.current();
        f.debug_struct("SourceService")
            .field("generation", &generation.version())
            .field("sources", &generation.registry().len())
            .field("cached", &generation.cache().len())
            .field("reloadable", &self.fetcher.is_some())
            .finish()
    }
}

/// Builder for [`SourceService`]. Collaborators not supplied fall back to a
/// passthrough interpolator, no variables, no fetcher, and a tracing notifier.
pub struct SourceServiceBuilder {
    class_loader: Arc<dyn ClassLoader>,
    interpolator: Arc<dyn Interpolator>,
    variables: Arc<dyn VariableSource>,
    fetcher: Option<Arc<dyn SettingsFetcher>>,
    notifier: Arc<dyn FailureNotifier>,
}

impl SourceServiceBuilder {
    pub fn interpolator(mut self, interpolator: Arc<dyn Interpolator>) -> Self {
        self.interpolator = interpolator;
        self
    }

    pub fn variables(mut self, variables: Arc<dyn VariableSource>) -> Self {
        self.variables = variables;
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn SettingsFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn FailureNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn build(self) -> SourceService {
        SourceService {
            state: ResolverState::new(),
            loader: InstanceLoader::new(
                self.class_loader,
                self.interpolator.clone(),
                self.notifier,
            ),
            interpolator: self.interpolator,
            variables: self.variables,
            fetcher: self.fetcher,
            runtime: Mutex::new(Vec::new()),
        }
    }
}
