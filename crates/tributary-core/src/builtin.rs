// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in pseudo-sources.
//!
//! The expression pseudo-source is always registered and never needs a class
//! load. The platform, mixed, and dashboard pseudo-sources are ordinary
//! settings records that payloads normally carry; [`builtin_sources`] returns
//! them for payloads that do not.

use std::sync::{Arc, OnceLock};

use crate::instance::SourceInstance;
use crate::traits::connector::Connector;
use crate::types::{
    DASHBOARD_PLUGIN_ID, DASHBOARD_SOURCE_NAME, EXPRESSION_NAME, EXPRESSION_UID, MIXED_PLUGIN_ID,
    MIXED_SOURCE_NAME, PLATFORM_PLUGIN_ID, PLATFORM_SOURCE_NAME, PluginMeta, SourceSettings,
};

/// Settings record of the expression pseudo-source.
pub fn expression_settings() -> SourceSettings {
    let meta = PluginMeta {
        id: EXPRESSION_UID.to_string(),
        name: EXPRESSION_NAME.to_string(),
        metrics: true,
        builtin: true,
        ..Default::default()
    };
    SourceSettings {
        name: EXPRESSION_NAME.to_string(),
        uid: EXPRESSION_UID.to_string(),
        source_type: EXPRESSION_UID.to_string(),
        meta,
        ..Default::default()
    }
}

/// The always-available expression connector.
#[derive(Debug)]
pub struct ExpressionConnector {
    settings: SourceSettings,
}

impl ExpressionConnector {
    pub fn new() -> Self {
        Self {
            settings: expression_settings(),
        }
    }
}

impl Default for ExpressionConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for ExpressionConnector {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn id(&self) -> Option<i64> {
        None
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

/// Process-wide expression instance, shared by every generation.
pub fn expression_instance() -> Arc<SourceInstance> {
    static INSTANCE: OnceLock<Arc<SourceInstance>> = OnceLock::new();
    INSTANCE
        .get_or_init(|| Arc::new(SourceInstance::new(Box::new(ExpressionConnector::new()))))
        .clone()
}

fn pseudo_source(name: &str, plugin_id: &str, meta: PluginMeta) -> SourceSettings {
    SourceSettings {
        name: name.to_string(),
        // Empty uid is defaulted to the name at ingestion.
        uid: String::new(),
        source_type: plugin_id.to_string(),
        meta,
        ..Default::default()
    }
}

/// Returns settings for the platform, mixed, and dashboard pseudo-sources.
pub fn builtin_sources() -> Vec<SourceSettings> {
    vec![
        pseudo_source(
            PLATFORM_SOURCE_NAME,
            PLATFORM_PLUGIN_ID,
            PluginMeta {
                metrics: true,
                annotations: true,
                builtin: true,
                ..PluginMeta::new(PLATFORM_PLUGIN_ID)
            },
        ),
        pseudo_source(
            MIXED_SOURCE_NAME,
            MIXED_PLUGIN_ID,
            PluginMeta {
                metrics: true,
                builtin: true,
                ..PluginMeta::new(MIXED_PLUGIN_ID)
            },
        ),
        pseudo_source(
            DASHBOARD_SOURCE_NAME,
            DASHBOARD_PLUGIN_ID,
            PluginMeta {
                metrics: true,
                builtin: true,
                ..PluginMeta::new(DASHBOARD_PLUGIN_ID)
            },
        ),
    ]
}

/// True if the plugin id belongs to one of the listed-only-on-request pseudo-sources.
pub fn is_pseudo_plugin(plugin_id: &str) -> bool {
    matches!(
        plugin_id,
        PLATFORM_PLUGIN_ID | MIXED_PLUGIN_ID | DASHBOARD_PLUGIN_ID
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceRef;

    #[test]
    fn builtin_sources_returns_three_entries() {
        let sources = builtin_sources();
        assert_eq!(sources.len(), 3);
        assert!(sources.iter().all(|s| is_pseudo_plugin(&s.meta.id)));
        assert!(sources.iter().all(|s| s.uid.is_empty()));
    }

    #[test]
    fn expression_connector_has_sentinel_identity() {
        let instance = expression_instance();
        assert_eq!(instance.uid(), EXPRESSION_UID);
        assert_eq!(instance.name(), EXPRESSION_NAME);
        assert_eq!(instance.get_ref(), SourceRef::new(EXPRESSION_UID, EXPRESSION_UID));
    }

    #[test]
    fn expression_instance_is_shared() {
        assert!(Arc::ptr_eq(&expression_instance(), &expression_instance()));
    }

    #[test]
    fn ordinary_plugins_are_not_pseudo() {
        assert!(!is_pseudo_plugin("prometheus"));
        assert!(is_pseudo_plugin(MIXED_PLUGIN_ID));
    }
}
