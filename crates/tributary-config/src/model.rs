// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for source settings files.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! keys at load time, providing actionable error messages.

use serde::{Deserialize, Serialize};
use tributary_core::builtin::builtin_sources;
use tributary_core::{PluginMeta, SettingsPayload, SourceSettings};

/// Top-level sources configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. Every key is optional.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    /// Uid or name of the default source.
    #[serde(default)]
    pub default_source: String,

    /// Append the platform, mixed, and dashboard pseudo sources.
    #[serde(default = "default_true")]
    pub include_builtin_sources: bool,

    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            default_source: String::new(),
            include_builtin_sources: true,
            sources: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// One `[[sources]]` entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub name: String,

    /// Stable identifier; the name is used when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    /// Legacy numeric id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// Connector kind.
    #[serde(rename = "type")]
    pub source_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetaConfig>,

    #[serde(default)]
    pub is_default: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,

    #[serde(default)]
    pub read_only: bool,

    /// Connector-specific options, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_data: Option<serde_json::Value>,
}

impl SourceConfig {
    /// The uid this entry registers under.
    pub fn effective_uid(&self) -> &str {
        match self.uid.as_deref() {
            Some(uid) if !uid.is_empty() => uid,
            _ => &self.name,
        }
    }

    /// Convert into a registry record. The plugin id defaults to the type.
    pub fn to_settings(&self) -> SourceSettings {
        let meta = match &self.meta {
            Some(meta) => meta.to_plugin_meta(&self.source_type),
            None => PluginMeta::new(self.source_type.clone()),
        };
        SourceSettings {
            id: self.id,
            uid: self.effective_uid().to_string(),
            name: self.name.clone(),
            source_type: self.source_type.clone(),
            meta,
            is_default: self.is_default,
            raw_ref: None,
            url: self.url.clone(),
            access: self.access.clone(),
            read_only: self.read_only,
            json_data: self.json_data.clone().unwrap_or_default(),
        }
    }
}

/// `[sources.meta]` capability descriptor.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetaConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub alias_ids: Vec<String>,
    #[serde(default)]
    pub module: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub metrics: bool,
    #[serde(default)]
    pub logs: bool,
    #[serde(default)]
    pub tracing: bool,
    #[serde(default)]
    pub annotations: bool,
    #[serde(default)]
    pub alerting: bool,
    #[serde(default)]
    pub builtin: bool,
}

impl MetaConfig {
    fn to_plugin_meta(&self, source_type: &str) -> PluginMeta {
        let id = self
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| source_type.to_string());
        PluginMeta {
            name: self.name.clone().unwrap_or_else(|| id.clone()),
            id,
            alias_ids: self.alias_ids.clone(),
            module: self.module.clone(),
            base_url: self.base_url.clone(),
            category: self.category.clone(),
            metrics: self.metrics,
            logs: self.logs,
            tracing: self.tracing,
            annotations: self.annotations,
            alerting: self.alerting,
            builtin: self.builtin,
        }
    }
}

impl SourcesConfig {
    /// Build the payload handed to `SourceService::init`.
    ///
    /// An empty `default_source` falls back to the first entry flagged
    /// `is_default`. Entries addressed by the default get `is_default` set.
    /// Pseudo sources are appended unless disabled or shadowed by name.
    pub fn to_payload(&self) -> SettingsPayload {
        let default_source = if self.default_source.is_empty() {
            self.sources
                .iter()
                .find(|s| s.is_default)
                .map(|s| s.effective_uid().to_string())
                .unwrap_or_default()
        } else {
            self.default_source.clone()
        };

        let mut sources: Vec<SourceSettings> = self
            .sources
            .iter()
            .map(|entry| {
                let mut settings = entry.to_settings();
                if !default_source.is_empty()
                    && (settings.uid == default_source || settings.name == default_source)
                {
                    settings.is_default = true;
                }
                settings
            })
            .collect();

        if self.include_builtin_sources {
            for builtin in builtin_sources() {
                if !sources.iter().any(|s| s.name == builtin.name) {
                    sources.push(builtin);
                }
            }
        }

        SettingsPayload {
            default_source,
            sources,
        }
    }
}
