// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source settings, references, and the well-known pseudo-source identifiers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Canonical uid (and type) of the built-in expression pseudo-source.
pub const EXPRESSION_UID: &str = "__expr__";

/// Legacy sentinel uid that also addresses the expression pseudo-source.
pub const EXPRESSION_LEGACY_UID: &str = "-100";

/// Display name of the expression pseudo-source.
pub const EXPRESSION_NAME: &str = "Expression";

/// Token that stands for the process-wide default source.
pub const DEFAULT_MARKER: &str = "default";

/// Leading character of a template-variable reference.
pub const VARIABLE_SIGIL: char = '$';

/// Plugin id of the core platform pseudo-source.
pub const PLATFORM_PLUGIN_ID: &str = "platform";
/// Plugin id of the mixed pseudo-source.
pub const MIXED_PLUGIN_ID: &str = "mixed";
/// Plugin id of the dashboard pseudo-source.
pub const DASHBOARD_PLUGIN_ID: &str = "dashboard";

/// Registered name of the core platform pseudo-source.
pub const PLATFORM_SOURCE_NAME: &str = "-- Platform --";
/// Registered name of the mixed pseudo-source.
pub const MIXED_SOURCE_NAME: &str = "-- Mixed --";
/// Registered name of the dashboard pseudo-source.
pub const DASHBOARD_SOURCE_NAME: &str = "-- Dashboard --";

/// Category value that marks a plugin as a log source.
pub const LOGGING_CATEGORY: &str = "logging";

/// Scoped variable bindings handed through to the interpolator untouched.
pub type ScopedVars = HashMap<String, serde_json::Value>;

/// Capability descriptor and plugin identity of a connector kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginMeta {
    /// Plugin identifier used for class loading (e.g. "prometheus").
    pub id: String,
    /// Human-readable plugin name.
    pub name: String,
    /// Alternative identifiers this plugin answers to.
    pub alias_ids: Vec<String>,
    /// Module path of the plugin bundle.
    pub module: String,
    /// Base URL the plugin bundle is served from.
    pub base_url: String,
    /// Plugin category (e.g. "logging", "tsdb").
    pub category: Option<String>,
    pub metrics: bool,
    pub logs: bool,
    pub tracing: bool,
    pub annotations: bool,
    pub alerting: bool,
    /// Whether the plugin ships with the platform.
    pub builtin: bool,
}

impl PluginMeta {
    /// Creates metadata for the given plugin id with no capabilities.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            ..Default::default()
        }
    }

    /// True if at least one of the five consumable capabilities is declared.
    pub fn has_any_capability(&self) -> bool {
        self.metrics || self.logs || self.tracing || self.annotations || self.alerting
    }

    /// True if the plugin serves logs, either by flag or by category.
    pub fn serves_logs(&self) -> bool {
        self.logs || self.category.as_deref() == Some(LOGGING_CATEGORY)
    }

    /// Structural plugin identity match: the id itself or any of its aliases.
    pub fn matches_plugin_id(&self, plugin_id: &str) -> bool {
        self.id == plugin_id || self.alias_ids.iter().any(|alias| alias == plugin_id)
    }
}

/// Structured `{type, uid}` reference to a source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl SourceRef {
    pub fn new(source_type: impl Into<String>, uid: impl Into<String>) -> Self {
        Self {
            source_type: Some(source_type.into()),
            uid: Some(uid.into()),
        }
    }

    /// True if this reference addresses the expression pseudo-source.
    pub fn is_expression(&self) -> bool {
        self.source_type.as_deref() == Some(EXPRESSION_UID)
            || matches!(
                self.uid.as_deref(),
                Some(EXPRESSION_UID) | Some(EXPRESSION_LEGACY_UID)
            )
    }
}

/// Static metadata describing one configured connector instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Legacy numeric id; absent on synthetic entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Stable identifier. Defaulted to `name` at ingestion when empty.
    #[serde(default)]
    pub uid: String,
    /// Display name, unique within a generation.
    pub name: String,
    /// Connector kind (plugin id).
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub meta: PluginMeta,
    #[serde(default)]
    pub is_default: bool,
    /// Set on records synthesized through variable indirection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_ref: Option<SourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    /// Connector-specific options, opaque to the registry.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub json_data: serde_json::Value,
}

impl SourceSettings {
    /// Creates settings with the given name, uid, and plugin id.
    pub fn new(name: impl Into<String>, uid: impl Into<String>, plugin_id: &str) -> Self {
        Self {
            name: name.into(),
            uid: uid.into(),
            source_type: plugin_id.to_string(),
            meta: PluginMeta::new(plugin_id),
            ..Default::default()
        }
    }

    /// Returns the `{type, uid}` reference for these settings.
    pub fn get_ref(&self) -> SourceRef {
        SourceRef::new(self.source_type.clone(), self.uid.clone())
    }

    /// Returns a shallow copy renamed to `token`, as handed out for
    /// variable-bound references.
    pub fn aliased(&self, token: &str) -> Self {
        Self {
            is_default: false,
            name: token.to_string(),
            uid: token.to_string(),
            ..self.clone()
        }
    }
}

/// Any of the alias forms a caller can use to address a source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceLookup {
    /// A uid, display name, variable token, or stringified legacy id.
    Token(String),
    /// A structured `{type, uid}` reference.
    Ref(SourceRef),
    /// A legacy numeric id.
    Id(i64),
}

impl SourceLookup {
    /// Returns the bare token carried by this lookup, if any.
    pub fn token(&self) -> Option<String> {
        match self {
            SourceLookup::Token(token) => Some(token.clone()),
            SourceLookup::Ref(source_ref) => source_ref.uid.clone(),
            SourceLookup::Id(id) => Some(id.to_string()),
        }
    }

    /// True if this lookup addresses the expression pseudo-source.
    pub fn is_expression(&self) -> bool {
        match self {
            SourceLookup::Token(token) => matches!(
                token.as_str(),
                EXPRESSION_UID | EXPRESSION_LEGACY_UID | EXPRESSION_NAME
            ),
            SourceLookup::Ref(source_ref) => source_ref.is_expression(),
            SourceLookup::Id(id) => id.to_string() == EXPRESSION_LEGACY_UID,
        }
    }
}

impl From<&str> for SourceLookup {
    fn from(token: &str) -> Self {
        SourceLookup::Token(token.to_string())
    }
}

impl From<String> for SourceLookup {
    fn from(token: String) -> Self {
        SourceLookup::Token(token)
    }
}

impl From<SourceRef> for SourceLookup {
    fn from(source_ref: SourceRef) -> Self {
        SourceLookup::Ref(source_ref)
    }
}

impl From<i64> for SourceLookup {
    fn from(id: i64) -> Self {
        SourceLookup::Id(id)
    }
}

/// Current value of a datasource template variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Single(String),
    Multi(Vec<String>),
}

/// A template variable of kind "datasource".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceVariable {
    pub name: String,
    pub current: VariableValue,
}

impl DatasourceVariable {
    pub fn new(name: impl Into<String>, current: VariableValue) -> Self {
        Self {
            name: name.into(),
            current,
        }
    }

    /// The reference token that addresses this variable, `${name}`.
    pub fn reference_token(&self) -> String {
        format!("${{{}}}", self.name)
    }
}

/// The registry contents delivered by `init` and `reload`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPayload {
    /// Identifier (uid or name) of the default source.
    #[serde(default)]
    pub default_source: String,
    #[serde(default)]
    pub sources: Vec<SourceSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_deserialize_with_type_rename() {
        let json = serde_json::json!({
            "id": 3,
            "uid": "abc",
            "name": "Loki",
            "type": "loki",
            "meta": { "id": "loki", "category": "logging" }
        });
        let settings: SourceSettings = serde_json::from_value(json).unwrap();
        assert_eq!(settings.source_type, "loki");
        assert_eq!(settings.id, Some(3));
        assert!(settings.meta.serves_logs());
        assert!(!settings.meta.logs);
        assert!(settings.json_data.is_null());
    }

    #[test]
    fn missing_uid_deserializes_as_empty() {
        let json = serde_json::json!({ "name": "-- Mixed --", "type": "mixed" });
        let settings: SourceSettings = serde_json::from_value(json).unwrap();
        assert!(settings.uid.is_empty());
        assert!(settings.id.is_none());
    }

    #[test]
    fn plugin_id_matches_aliases() {
        let mut meta = PluginMeta::new("prometheus");
        meta.alias_ids = vec!["prom".to_string()];
        assert!(meta.matches_plugin_id("prometheus"));
        assert!(meta.matches_plugin_id("prom"));
        assert!(!meta.matches_plugin_id("loki"));
    }

    #[test]
    fn expression_lookups_are_detected() {
        assert!(SourceLookup::from("__expr__").is_expression());
        assert!(SourceLookup::from("-100").is_expression());
        assert!(SourceLookup::from("Expression").is_expression());
        assert!(SourceLookup::from(-100).is_expression());
        assert!(SourceLookup::from(SourceRef::new("__expr__", "whatever")).is_expression());
        assert!(!SourceLookup::from("prometheus").is_expression());
    }

    #[test]
    fn aliased_copy_overwrites_identity_only() {
        let mut settings = SourceSettings::new("A", "uidA", "prometheus");
        settings.is_default = true;
        settings.id = Some(1);
        let aliased = settings.aliased("$ds");
        assert_eq!(aliased.name, "$ds");
        assert_eq!(aliased.uid, "$ds");
        assert!(!aliased.is_default);
        assert_eq!(aliased.id, Some(1));
        assert_eq!(aliased.meta, settings.meta);
    }

    #[test]
    fn variable_value_is_untagged() {
        let single: VariableValue = serde_json::from_str("\"uidA\"").unwrap();
        assert_eq!(single, VariableValue::Single("uidA".into()));
        let multi: VariableValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(multi, VariableValue::Multi(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn reference_token_wraps_variable_name() {
        let var = DatasourceVariable::new("ds", VariableValue::Single("uidA".into()));
        assert_eq!(var.reference_token(), "${ds}");
    }
}
