// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runtime connector instances as handed out by the loader.
//!
//! [`SourceInstance::build`] always yields a value that satisfies the common
//! capability set: bare legacy objects are wrapped in a [`PatchedConnector`]
//! whose identity comes from the resolved settings.

use std::any::Any;
use std::ops::Deref;

use crate::traits::connector::{Connector, Constructed};
use crate::types::{PluginMeta, SourceSettings};

/// A constructed connector plus the auxiliary components its plugin supplied.
pub struct SourceInstance {
    connector: Box<dyn Connector>,
    components: Option<serde_json::Value>,
}

impl SourceInstance {
    /// Wraps a connector that already implements the capability set.
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self {
            connector,
            components: None,
        }
    }

    /// Builds an instance from a factory result and the settings it was
    /// constructed from.
    pub fn build(constructed: Constructed, settings: &SourceSettings) -> Self {
        match constructed {
            Constructed::Conforming(connector) => Self::new(connector),
            Constructed::Bare(inner) => Self::new(Box::new(PatchedConnector::wrap(inner, settings))),
        }
    }

    pub fn with_components(mut self, components: Option<serde_json::Value>) -> Self {
        self.components = components;
        self
    }

    pub fn connector(&self) -> &dyn Connector {
        self.connector.as_ref()
    }

    /// Plugin-supplied UI components, passed through untouched.
    pub fn components(&self) -> Option<&serde_json::Value> {
        self.components.as_ref()
    }
}

impl Deref for SourceInstance {
    type Target = dyn Connector;

    fn deref(&self) -> &Self::Target {
        self.connector.as_ref()
    }
}

impl std::fmt::Debug for SourceInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceInstance")
            .field("name", &self.connector.name())
            .field("uid", &self.connector.uid())
            .field("type", &self.connector.source_type())
            .field("components", &self.components.is_some())
            .finish()
    }
}

/// Capability wrapper around a connector object that predates [`Connector`].
pub struct PatchedConnector {
    name: String,
    id: Option<i64>,
    source_type: String,
    meta: PluginMeta,
    uid: String,
    inner: Box<dyn Any + Send + Sync>,
}

impl PatchedConnector {
    pub fn wrap(inner: Box<dyn Any + Send + Sync>, settings: &SourceSettings) -> Self {
        Self {
            name: settings.name.clone(),
            id: settings.id,
            source_type: settings.source_type.clone(),
            meta: settings.meta.clone(),
            uid: settings.uid.clone(),
            inner,
        }
    }

    /// The wrapped legacy object.
    pub fn inner(&self) -> &(dyn Any + Send + Sync) {
        self.inner.as_ref()
    }
}

impl Connector for PatchedConnector {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn source_type(&self) -> &str {
        &self.source_type
    }

    fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    fn uid(&self) -> &str {
        &self.uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceRef;

    struct OldStyle {
        endpoint: String,
    }

    #[test]
    fn bare_objects_get_identity_from_settings() {
        let mut settings = SourceSettings::new("Old", "uidOld", "graphite");
        settings.id = Some(7);
        let constructed = Constructed::Bare(Box::new(OldStyle {
            endpoint: "http://graphite".into(),
        }));

        let instance = SourceInstance::build(constructed, &settings);
        assert_eq!(instance.name(), "Old");
        assert_eq!(instance.uid(), "uidOld");
        assert_eq!(instance.id(), Some(7));
        assert_eq!(instance.source_type(), "graphite");
        assert_eq!(instance.meta().id, "graphite");
        assert_eq!(instance.get_ref(), SourceRef::new("graphite", "uidOld"));
    }

    #[test]
    fn patched_connector_exposes_inner_object() {
        let settings = SourceSettings::new("Old", "uidOld", "graphite");
        let patched = PatchedConnector::wrap(
            Box::new(OldStyle {
                endpoint: "http://graphite".into(),
            }),
            &settings,
        );
        let inner = patched.inner().downcast_ref::<OldStyle>().unwrap();
        assert_eq!(inner.endpoint, "http://graphite");
    }

    #[test]
    fn components_pass_through() {
        let settings = SourceSettings::new("New", "uidNew", "loki");
        let instance = SourceInstance::build(Constructed::Bare(Box::new(())), &settings)
            .with_components(Some(serde_json::json!({ "QueryEditor": "loki-editor" })));
        assert_eq!(
            instance.components().unwrap()["QueryEditor"],
            serde_json::json!("loki-editor")
        );
    }
}
