// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock template variables, failure notifier, and settings fetcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;
use tributary_core::types::VARIABLE_SIGIL;
use tributary_core::{
    ArrayPolicy, DatasourceVariable, FailureNotifier, Interpolator, ScopedVars, SettingsFetcher,
    SettingsPayload, TributaryError, VariableSource, VariableValue,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Datasource template variables that can be changed mid-test.
///
/// Implements both [`Interpolator`] and [`VariableSource`] so resolution and
/// listing see the same values. Scoped variables take precedence over the
/// table; unknown tokens pass through unchanged.
#[derive(Debug, Default)]
pub struct MockTemplateVars {
    variables: Mutex<Vec<DatasourceVariable>>,
    interpolations: AtomicUsize,
}

impl MockTemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the current value of a datasource variable.
    pub fn set(&self, name: &str, value: VariableValue) {
        let mut variables = lock(&self.variables);
        match variables.iter_mut().find(|v| v.name == name) {
            Some(existing) => existing.current = value,
            None => variables.push(DatasourceVariable::new(name, value)),
        }
    }

    pub fn remove(&self, name: &str) {
        lock(&self.variables).retain(|v| v.name != name);
    }

    /// Number of `interpolate` calls seen so far.
    pub fn interpolations(&self) -> usize {
        self.interpolations.load(Ordering::SeqCst)
    }

    fn variable_name(token: &str) -> Option<&str> {
        let rest = token.strip_prefix(VARIABLE_SIGIL)?;
        match rest.strip_prefix('{') {
            Some(braced) => braced.strip_suffix('}'),
            None => Some(rest),
        }
    }
}

impl Interpolator for MockTemplateVars {
    fn interpolate(&self, token: &str, scope: Option<&ScopedVars>, policy: ArrayPolicy) -> String {
        self.interpolations.fetch_add(1, Ordering::SeqCst);
        let Some(name) = Self::variable_name(token) else {
            return token.to_string();
        };

        if let Some(value) = scope.and_then(|scope| scope.get(name)) {
            match value {
                serde_json::Value::String(s) => return s.clone(),
                serde_json::Value::Array(items) => {
                    let values: Vec<String> = items
                        .iter()
                        .filter_map(|item| item.as_str().map(str::to_string))
                        .collect();
                    return policy.apply(&values);
                }
                _ => {}
            }
        }

        let variables = lock(&self.variables);
        match variables.iter().find(|v| v.name == name).map(|v| &v.current) {
            Some(VariableValue::Single(value)) => value.clone(),
            Some(VariableValue::Multi(values)) => policy.apply(values),
            None => token.to_string(),
        }
    }
}

impl VariableSource for MockTemplateVars {
    fn datasource_variables(&self) -> Vec<DatasourceVariable> {
        lock(&self.variables).clone()
    }
}

/// Notifier that records every load failure.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    failures: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(source_name, detail)` pairs in notification order.
    pub fn failures(&self) -> Vec<(String, String)> {
        lock(&self.failures).clone()
    }

    pub fn count(&self) -> usize {
        lock(&self.failures).len()
    }
}

impl FailureNotifier for RecordingNotifier {
    fn notify_load_failure(&self, source_name: &str, detail: &str) {
        lock(&self.failures).push((source_name.to_string(), detail.to_string()));
    }
}

/// Fetcher that returns a settable payload, or fails when told to.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    payload: AsyncMutex<Option<SettingsPayload>>,
    fetches: AtomicUsize,
}

impl StaticFetcher {
    pub fn new(payload: SettingsPayload) -> Self {
        Self {
            payload: AsyncMutex::new(Some(payload)),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A fetcher whose backend is unreachable.
    pub fn offline() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the payload returned by subsequent fetches.
    pub async fn set(&self, payload: SettingsPayload) {
        *self.payload.lock().await = Some(payload);
    }

    /// Make subsequent fetches fail.
    pub async fn go_offline(&self) {
        *self.payload.lock().await = None;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsFetcher for StaticFetcher {
    async fn fetch_settings(&self) -> Result<SettingsPayload, TributaryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.payload
            .lock()
            .await
            .clone()
            .ok_or_else(|| TributaryError::Fetch("settings backend unreachable".to_string()))
    }
}

/// Scoped variables from `(name, value)` string pairs.
pub fn scoped_vars(pairs: &[(&str, &str)]) -> ScopedVars {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::String(value.to_string())))
        .collect::<HashMap<_, _>>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_braced_and_bare_tokens() {
        let vars = MockTemplateVars::new();
        vars.set("ds", VariableValue::Single("uidB".into()));
        assert_eq!(vars.interpolate("$ds", None, ArrayPolicy::FirstOfArray), "uidB");
        assert_eq!(vars.interpolate("${ds}", None, ArrayPolicy::FirstOfArray), "uidB");
        assert_eq!(vars.interpolate("$other", None, ArrayPolicy::FirstOfArray), "$other");
        assert_eq!(vars.interpolate("plain", None, ArrayPolicy::FirstOfArray), "plain");
        assert_eq!(vars.interpolations(), 4);
    }

    #[test]
    fn multi_values_follow_array_policy() {
        let vars = MockTemplateVars::new();
        vars.set("ds", VariableValue::Multi(vec!["a".into(), "b".into()]));
        assert_eq!(vars.interpolate("$ds", None, ArrayPolicy::FirstOfArray), "a");
        vars.set("ds", VariableValue::Multi(Vec::new()));
        assert_eq!(vars.interpolate("$ds", None, ArrayPolicy::FirstOfArray), "");
    }

    #[test]
    fn scoped_values_override_table() {
        let vars = MockTemplateVars::new();
        vars.set("ds", VariableValue::Single("uidB".into()));
        let scope = scoped_vars(&[("ds", "uidC")]);
        assert_eq!(
            vars.interpolate("$ds", Some(&scope), ArrayPolicy::FirstOfArray),
            "uidC"
        );
    }

    #[test]
    fn set_replaces_existing_variable() {
        let vars = MockTemplateVars::new();
        vars.set("ds", VariableValue::Single("a".into()));
        vars.set("ds", VariableValue::Single("b".into()));
        let listed = vars.datasource_variables();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].current, VariableValue::Single("b".into()));
    }

    #[tokio::test]
    async fn static_fetcher_serves_and_fails() {
        let fetcher = StaticFetcher::new(SettingsPayload::default());
        assert!(fetcher.fetch_settings().await.is_ok());
        fetcher.go_offline().await;
        assert!(fetcher.fetch_settings().await.is_err());
        assert_eq!(fetcher.fetches(), 2);
    }
}
