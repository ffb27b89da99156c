// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability-based source listing for selection UIs.

use std::sync::Arc;

use tributary_core::builtin::is_pseudo_plugin;
use tributary_core::types::{
    DASHBOARD_SOURCE_NAME, DEFAULT_MARKER, MIXED_SOURCE_NAME, PLATFORM_SOURCE_NAME,
};
use tributary_core::{SourceSettings, VariableSource, VariableValue};

use crate::registry::Registry;

/// Caller-supplied predicate applied to every candidate.
pub type SourcePredicate = Arc<dyn Fn(&SourceSettings) -> bool + Send + Sync>;

/// Matches a record's connector type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFilter {
    Exact(String),
    AnyOf(Vec<String>),
}

impl TypeFilter {
    pub fn matches(&self, source_type: &str) -> bool {
        match self {
            TypeFilter::Exact(expected) => expected == source_type,
            TypeFilter::AnyOf(types) => types.iter().any(|t| t == source_type),
        }
    }
}

/// Filters for [`list`]. Every filter that is set must pass.
#[derive(Clone, Default)]
pub struct ListFilters {
    pub metrics: bool,
    /// Passes on the logs flag or a "logging" category.
    pub logs: bool,
    pub tracing: bool,
    pub annotations: bool,
    pub alerting: bool,
    pub plugin_id: Option<String>,
    pub filter: Option<SourcePredicate>,
    pub source_type: Option<TypeFilter>,
    /// Include sources that declare no capability at all.
    pub all: bool,
    /// Append one entry per datasource template variable.
    pub variables: bool,
    pub mixed: bool,
    pub dashboard: bool,
}

impl ListFilters {
    fn capability_requested(&self) -> bool {
        self.metrics || self.logs || self.tracing || self.annotations || self.alerting
    }

    fn accepts(&self, settings: &SourceSettings) -> bool {
        let meta = &settings.meta;
        if is_pseudo_plugin(&meta.id) {
            return false;
        }
        if self.metrics && !meta.metrics {
            return false;
        }
        if self.tracing && !meta.tracing {
            return false;
        }
        if self.logs && !meta.serves_logs() {
            return false;
        }
        if self.annotations && !meta.annotations {
            return false;
        }
        if self.alerting && !meta.alerting {
            return false;
        }
        if let Some(plugin_id) = &self.plugin_id
            && !meta.matches_plugin_id(plugin_id)
        {
            return false;
        }
        if let Some(filter) = &self.filter
            && !filter(settings)
        {
            return false;
        }
        if let Some(source_type) = &self.source_type
            && !source_type.matches(&settings.source_type)
        {
            return false;
        }
        if !self.all && !self.capability_requested() && !meta.has_any_capability() {
            return false;
        }
        true
    }
}

impl std::fmt::Debug for ListFilters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListFilters")
            .field("metrics", &self.metrics)
            .field("logs", &self.logs)
            .field("tracing", &self.tracing)
            .field("annotations", &self.annotations)
            .field("alerting", &self.alerting)
            .field("plugin_id", &self.plugin_id)
            .field("filter", &self.filter.is_some())
            .field("source_type", &self.source_type)
            .field("all", &self.all)
            .field("variables", &self.variables)
            .field("mixed", &self.mixed)
            .field("dashboard", &self.dashboard)
            .finish()
    }
}

/// Produce the sorted selection list for `filters`.
///
/// Never fails; entries that cannot be resolved are skipped.
pub fn list(
    registry: &Registry,
    variables: &dyn VariableSource,
    filters: &ListFilters,
) -> Vec<SourceSettings> {
    let mut sources: Vec<SourceSettings> = registry
        .get_all()
        .filter(|settings| filters.accepts(settings))
        .cloned()
        .collect();

    if filters.variables {
        for variable in variables.datasource_variables() {
            let value = match variable.current {
                VariableValue::Single(ref value) if value == DEFAULT_MARKER => {
                    registry.default_source().to_string()
                }
                VariableValue::Single(ref value) => value.clone(),
                VariableValue::Multi(ref values) if values.len() == 1 => values[0].clone(),
                VariableValue::Multi(_) => continue,
            };
            if let Some(found) = registry.lookup_uid_or_name(&value) {
                sources.push(found.aliased(&variable.reference_token()));
            }
        }
    }

    sources.sort_by_key(|settings| settings.name.to_lowercase());

    if filters.plugin_id.is_none() && !filters.alerting {
        let mut append = |name: &str| {
            if let Some(found) = registry.lookup(name) {
                sources.push(found.clone());
            }
        };
        if filters.mixed {
            append(MIXED_SOURCE_NAME);
        }
        if filters.dashboard {
            append(DASHBOARD_SOURCE_NAME);
        }
        if !filters.tracing {
            append(PLATFORM_SOURCE_NAME);
        }
    }

    sources
}
