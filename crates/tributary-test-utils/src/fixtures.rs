// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings records used across integration tests.

use tributary_core::builtin::builtin_sources;
use tributary_core::{PluginMeta, SettingsPayload, SourceSettings};

/// A metrics source with the given identity.
pub fn metrics_source(name: &str, uid: &str, plugin_id: &str) -> SourceSettings {
    let mut settings = SourceSettings::new(name, uid, plugin_id);
    settings.meta.metrics = true;
    settings
}

/// A source with a numeric id.
pub fn numbered_source(name: &str, uid: &str, plugin_id: &str, id: i64) -> SourceSettings {
    let mut settings = metrics_source(name, uid, plugin_id);
    settings.id = Some(id);
    settings
}

/// A source whose meta is configured by `configure`.
pub fn source_with_meta(
    name: &str,
    uid: &str,
    plugin_id: &str,
    configure: impl FnOnce(&mut PluginMeta),
) -> SourceSettings {
    let mut settings = SourceSettings::new(name, uid, plugin_id);
    configure(&mut settings.meta);
    settings
}

/// Two metrics sources, "A"/uidA (prometheus, id 1) and "B"/uidB
/// (graphite, id 2), plus the built-in pseudo sources. Default is uidA.
pub fn sample_payload() -> SettingsPayload {
    let mut sources = vec![
        numbered_source("A", "uidA", "prometheus", 1),
        numbered_source("B", "uidB", "graphite", 2),
    ];
    sources.extend(builtin_sources());
    SettingsPayload {
        default_source: "uidA".to_string(),
        sources,
    }
}
