// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end resolution tests.
//!
//! `TestHarness` assembles a [`SourceService`] wired to mock collaborators
//! and initialized from a settings payload, so a test only has to describe
//! its sources and plugins.

use std::sync::Arc;
use std::time::Duration;

use tributary_core::{SettingsPayload, SourceSettings};
use tributary_registry::SourceService;

use crate::fixtures::sample_payload;
use crate::mock_collaborators::{MockTemplateVars, RecordingNotifier, StaticFetcher};
use crate::mock_loader::{FactoryOutput, MockClassLoader, TestFactory};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    payload: SettingsPayload,
    modern: Vec<(String, FactoryOutput)>,
    legacy: Vec<(String, FactoryOutput)>,
    failing: Vec<(String, String)>,
    delay: Option<Duration>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            payload: sample_payload(),
            modern: vec![
                ("prometheus".to_string(), FactoryOutput::Conforming),
                ("graphite".to_string(), FactoryOutput::Conforming),
            ],
            legacy: Vec::new(),
            failing: Vec::new(),
            delay: None,
        }
    }

    /// Replace the initial payload.
    pub fn with_payload(mut self, payload: SettingsPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Replace the initial sources, keeping the default.
    pub fn with_sources(mut self, sources: Vec<SourceSettings>) -> Self {
        self.payload.sources = sources;
        self
    }

    pub fn with_default(mut self, default_source: &str) -> Self {
        self.payload.default_source = default_source.to_string();
        self
    }

    /// Serve `plugin_id` with a directly constructed class.
    pub fn with_plugin(mut self, plugin_id: &str, output: FactoryOutput) -> Self {
        self.modern.retain(|(id, _)| id != plugin_id);
        self.modern.push((plugin_id.to_string(), output));
        self
    }

    /// Serve `plugin_id` with an injected-construction class.
    pub fn with_legacy_plugin(mut self, plugin_id: &str, output: FactoryOutput) -> Self {
        self.modern.retain(|(id, _)| id != plugin_id);
        self.legacy.push((plugin_id.to_string(), output));
        self
    }

    /// Make class loading for `plugin_id` fail with `message`.
    pub fn with_failing_plugin(mut self, plugin_id: &str, message: &str) -> Self {
        self.modern.retain(|(id, _)| id != plugin_id);
        self.failing.push((plugin_id.to_string(), message.to_string()));
        self
    }

    /// Delay every class load.
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Build the harness and initialize the service from the payload.
    pub fn build(self) -> TestHarness {
        let mut class_loader = MockClassLoader::new();
        let mut factories = Vec::new();
        for (plugin_id, output) in self.modern {
            let factory = Arc::new(TestFactory::new(output));
            class_loader = class_loader.with_modern(&plugin_id, factory.clone());
            factories.push((plugin_id, factory));
        }
        for (plugin_id, output) in self.legacy {
            let factory = Arc::new(TestFactory::new(output));
            class_loader = class_loader.with_legacy(&plugin_id, factory.clone());
            factories.push((plugin_id, factory));
        }
        for (plugin_id, message) in &self.failing {
            class_loader = class_loader.with_failure(plugin_id, message);
        }
        if let Some(delay) = self.delay {
            class_loader = class_loader.with_delay(delay);
        }

        let class_loader = Arc::new(class_loader);
        let vars = Arc::new(MockTemplateVars::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let fetcher = Arc::new(StaticFetcher::new(self.payload.clone()));

        let service = SourceService::builder(class_loader.clone())
            .interpolator(vars.clone())
            .variables(vars.clone())
            .notifier(notifier.clone())
            .fetcher(fetcher.clone())
            .build();
        service.init_payload(self.payload);

        TestHarness {
            service,
            class_loader,
            vars,
            notifier,
            fetcher,
            factories,
        }
    }
}

/// A fully wired source service and handles to its mocks.
pub struct TestHarness {
    pub service: SourceService,
    pub class_loader: Arc<MockClassLoader>,
    pub vars: Arc<MockTemplateVars>,
    pub notifier: Arc<RecordingNotifier>,
    pub fetcher: Arc<StaticFetcher>,
    factories: Vec<(String, Arc<TestFactory>)>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// The factory serving `plugin_id`, if one was registered.
    pub fn factory(&self, plugin_id: &str) -> Option<Arc<TestFactory>> {
        self.factories
            .iter()
            .find(|(id, _)| id == plugin_id)
            .map(|(_, factory)| factory.clone())
    }

    /// Construction count for `plugin_id`, zero if unknown.
    pub fn constructed(&self, plugin_id: &str) -> usize {
        self.factory(plugin_id).map_or(0, |f| f.constructed())
    }
}
