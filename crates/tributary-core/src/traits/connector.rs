// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The common connector capability set and the two construction conventions.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::TributaryError;
use crate::types::{PluginMeta, SourceRef, SourceSettings};

/// The capability set every runtime connector instance exposes.
///
/// Query execution and other connector-specific behavior live on the
/// concrete type; the registry only needs identity.
pub trait Connector: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn id(&self) -> Option<i64>;

    /// Connector kind (plugin id).
    fn source_type(&self) -> &str;

    fn meta(&self) -> &PluginMeta;

    fn uid(&self) -> &str;

    /// Returns the `{type, uid}` reference that addresses this instance.
    fn get_ref(&self) -> SourceRef {
        SourceRef::new(self.source_type(), self.uid())
    }
}

/// The value a connector factory hands back.
pub enum Constructed {
    /// The instance implements the common capability set itself.
    Conforming(Box<dyn Connector>),
    /// An older connector object that predates the capability set. The
    /// loader wraps it so identity comes from the resolved settings.
    Bare(Box<dyn Any + Send + Sync>),
}

impl std::fmt::Debug for Constructed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constructed::Conforming(connector) => f
                .debug_tuple("Conforming")
                .field(&connector.uid())
                .finish(),
            Constructed::Bare(_) => f.write_str("Bare"),
        }
    }
}

/// Factory for connectors that are constructed directly from settings.
pub trait ConnectorFactory: Send + Sync {
    fn create(&self, settings: SourceSettings) -> Result<Constructed, TributaryError>;
}

/// Factory for connectors that use dependency-injected construction.
pub trait LegacyConnectorFactory: Send + Sync {
    fn instantiate(&self, injector: &InjectionContext) -> Result<Constructed, TributaryError>;
}

/// A loaded connector class, tagged by its construction convention.
///
/// The tag is chosen by the class loader when the plugin is loaded, so the
/// instance loader never inspects the factory itself.
#[derive(Clone)]
pub enum ConnectorClass {
    Modern(Arc<dyn ConnectorFactory>),
    Legacy(Arc<dyn LegacyConnectorFactory>),
}

impl ConnectorClass {
    /// Constructs an instance with the convention this class declares.
    pub fn construct(&self, settings: &SourceSettings) -> Result<Constructed, TributaryError> {
        match self {
            ConnectorClass::Modern(factory) => factory.create(settings.clone()),
            ConnectorClass::Legacy(factory) => {
                factory.instantiate(&InjectionContext::with_instance_settings(settings.clone()))
            }
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, ConnectorClass::Legacy(_))
    }
}

impl std::fmt::Debug for ConnectorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorClass::Modern(_) => f.write_str("ConnectorClass::Modern"),
            ConnectorClass::Legacy(_) => f.write_str("ConnectorClass::Legacy"),
        }
    }
}

/// Named slots handed to legacy factories.
#[derive(Debug, Clone, Default)]
pub struct InjectionContext {
    locals: HashMap<&'static str, SourceSettings>,
}

impl InjectionContext {
    /// Slot under which the resolved settings are injected.
    pub const INSTANCE_SETTINGS: &'static str = "instance_settings";

    pub fn with_instance_settings(settings: SourceSettings) -> Self {
        let mut locals = HashMap::new();
        locals.insert(Self::INSTANCE_SETTINGS, settings);
        Self { locals }
    }

    pub fn local(&self, slot: &str) -> Option<&SourceSettings> {
        self.locals.get(slot)
    }

    pub fn instance_settings(&self) -> Option<&SourceSettings> {
        self.local(Self::INSTANCE_SETTINGS)
    }
}

/// Result of loading a plugin bundle: the class plus opaque UI components.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    pub class: ConnectorClass,
    pub components: Option<serde_json::Value>,
}

impl LoadedPlugin {
    pub fn modern(factory: Arc<dyn ConnectorFactory>) -> Self {
        Self {
            class: ConnectorClass::Modern(factory),
            components: None,
        }
    }

    pub fn legacy(factory: Arc<dyn LegacyConnectorFactory>) -> Self {
        Self {
            class: ConnectorClass::Legacy(factory),
            components: None,
        }
    }

    pub fn with_components(mut self, components: serde_json::Value) -> Self {
        self.components = Some(components);
        self
    }
}
