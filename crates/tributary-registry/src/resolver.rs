// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reference resolution.
//!
//! Every alias form is normalized once into a [`Reference`], then resolved
//! in strict order: expression short-circuit, default marker, variable
//! indirection, literal lookup. Exactly one branch is consulted.

use tracing::debug;
use tributary_core::types::{DEFAULT_MARKER, EXPRESSION_UID, VARIABLE_SIGIL};
use tributary_core::{ArrayPolicy, Interpolator, ScopedVars, SourceLookup, SourceSettings};

use crate::registry::Registry;

/// A caller-supplied reference after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// The built-in expression pseudo-source.
    Expression,
    /// The process-wide default source (absent, empty, or `"default"`).
    Default,
    /// A `$`-prefixed template variable token, kept uninterpolated.
    Variable(String),
    /// A uid, display name, or stringified legacy id.
    Literal(String),
}

impl Reference {
    pub fn normalize(lookup: Option<&SourceLookup>) -> Self {
        match lookup {
            None => Reference::Default,
            Some(lookup) if lookup.is_expression() => Reference::Expression,
            Some(lookup) => Self::from_token(lookup.token()),
        }
    }

    fn from_token(token: Option<String>) -> Self {
        match token {
            None => Reference::Default,
            Some(token) if token.is_empty() || token == DEFAULT_MARKER => Reference::Default,
            Some(token) if token.starts_with(VARIABLE_SIGIL) => Reference::Variable(token),
            Some(token) => Reference::Literal(token),
        }
    }
}

/// Resolve a normalized reference against one registry generation.
pub fn resolve(
    registry: &Registry,
    interpolator: &dyn Interpolator,
    reference: &Reference,
    scope: Option<&ScopedVars>,
) -> Option<SourceSettings> {
    match reference {
        Reference::Expression => registry.get_by_uid(EXPRESSION_UID).cloned(),
        Reference::Default => registry.default_settings().cloned(),
        Reference::Variable(token) => resolve_variable(registry, interpolator, token, scope),
        Reference::Literal(token) => registry.lookup(token).cloned(),
    }
}

/// Resolve a variable token through its current value.
///
/// The returned record keeps the uninterpolated token as its name and uid so
/// that holders of the record re-resolve through the variable on reuse.
fn resolve_variable(
    registry: &Registry,
    interpolator: &dyn Interpolator,
    token: &str,
    scope: Option<&ScopedVars>,
) -> Option<SourceSettings> {
    let interpolated = interpolator.interpolate(token, scope, ArrayPolicy::FirstOfArray);

    let found = if interpolated == DEFAULT_MARKER {
        registry.get_by_name(registry.default_source())
    } else {
        registry.lookup_uid_or_name(&interpolated)
    };

    let Some(found) = found else {
        debug!(token, interpolated = %interpolated, "variable reference did not resolve");
        return None;
    };

    let mut synthesized = found.aliased(token);
    synthesized.raw_ref = Some(found.get_ref());
    Some(synthesized)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tributary_core::types::{EXPRESSION_LEGACY_UID, EXPRESSION_NAME};
    use tributary_core::{PassthroughInterpolator, SourceRef};

    /// Replaces a whole `$name` token from a fixed table.
    struct TableInterpolator(HashMap<String, String>);

    impl Interpolator for TableInterpolator {
        fn interpolate(&self, token: &str, _scope: Option<&ScopedVars>, _policy: ArrayPolicy) -> String {
            let name = token.trim_start_matches('$');
            self.0.get(name).cloned().unwrap_or_else(|| token.to_string())
        }
    }

    fn table(pairs: &[(&str, &str)]) -> TableInterpolator {
        TableInterpolator(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn registry() -> Registry {
        let mut a = SourceSettings::new("A", "uidA", "prometheus");
        a.id = Some(1);
        a.is_default = true;
        a.meta.metrics = true;
        let mut b = SourceSettings::new("B", "uidB", "loki");
        b.id = Some(2);
        b.meta.logs = true;
        Registry::new(vec![a, b], "uidA")
    }

    fn lookup(token: &str) -> SourceLookup {
        SourceLookup::from(token)
    }

    #[test]
    fn normalize_classifies_tokens() {
        assert_eq!(Reference::normalize(None), Reference::Default);
        assert_eq!(Reference::normalize(Some(&lookup(""))), Reference::Default);
        assert_eq!(Reference::normalize(Some(&lookup("default"))), Reference::Default);
        assert_eq!(
            Reference::normalize(Some(&lookup("$ds"))),
            Reference::Variable("$ds".into())
        );
        assert_eq!(
            Reference::normalize(Some(&lookup("uidA"))),
            Reference::Literal("uidA".into())
        );
        assert_eq!(
            Reference::normalize(Some(&lookup(EXPRESSION_LEGACY_UID))),
            Reference::Expression
        );
        assert_eq!(
            Reference::normalize(Some(&SourceLookup::Ref(SourceRef::default()))),
            Reference::Default
        );
        assert_eq!(
            Reference::normalize(Some(&SourceLookup::Id(2))),
            Reference::Literal("2".into())
        );
    }

    #[test]
    fn expression_short_circuits() {
        let registry = registry();
        let expr = Reference::normalize(Some(&lookup(EXPRESSION_UID)));
        let settings = resolve(&registry, &PassthroughInterpolator, &expr, None).unwrap();
        assert_eq!(settings.name, EXPRESSION_NAME);
    }

    #[test]
    fn default_and_empty_match_stored_default() {
        let registry = registry();
        let stored = resolve(
            &registry,
            &PassthroughInterpolator,
            &Reference::Literal(registry.default_source().to_string()),
            None,
        );
        for reference in [None, Some(lookup("")), Some(lookup("default"))] {
            let resolved = resolve(
                &registry,
                &PassthroughInterpolator,
                &Reference::normalize(reference.as_ref()),
                None,
            );
            assert_eq!(resolved, stored);
        }
    }

    #[test]
    fn literal_falls_back_to_legacy_id() {
        let registry = registry();
        let by_id = resolve(
            &registry,
            &PassthroughInterpolator,
            &Reference::normalize(Some(&SourceLookup::Id(2))),
            None,
        )
        .unwrap();
        assert_eq!(by_id.uid, "uidB");
    }

    #[test]
    fn structured_ref_resolves_by_uid() {
        let registry = registry();
        let reference = Reference::normalize(Some(&SourceLookup::Ref(SourceRef::new("loki", "uidB"))));
        let settings = resolve(&registry, &PassthroughInterpolator, &reference, None).unwrap();
        assert_eq!(settings.name, "B");
    }

    #[test]
    fn variable_synthesizes_aliased_record() {
        let registry = registry();
        let interpolator = table(&[("ds", "uidB")]);
        let settings = resolve(
            &registry,
            &interpolator,
            &Reference::Variable("$ds".into()),
            None,
        )
        .unwrap();
        assert_eq!(settings.name, "$ds");
        assert_eq!(settings.uid, "$ds");
        assert!(!settings.is_default);
        assert_eq!(settings.source_type, "loki");
        assert_eq!(settings.raw_ref, Some(SourceRef::new("loki", "uidB")));
    }

    #[test]
    fn variable_resolves_by_name() {
        let registry = registry();
        let interpolator = table(&[("ds", "A")]);
        let settings = resolve(&registry, &interpolator, &Reference::Variable("$ds".into()), None)
            .unwrap();
        assert_eq!(settings.raw_ref, Some(SourceRef::new("prometheus", "uidA")));
        // The underlying default flag is never carried over.
        assert!(!settings.is_default);
    }

    #[test]
    fn variable_default_uses_default_by_name_only() {
        let interpolator = table(&[("ds", "default")]);

        // Default identifier stored as a uid: the name-only lookup misses.
        let by_uid = registry();
        assert!(resolve(&by_uid, &interpolator, &Reference::Variable("$ds".into()), None).is_none());

        let mut a = SourceSettings::new("A", "uidA", "prometheus");
        a.meta.metrics = true;
        let by_name = Registry::new(vec![a], "A");
        let settings =
            resolve(&by_name, &interpolator, &Reference::Variable("$ds".into()), None).unwrap();
        assert_eq!(settings.raw_ref, Some(SourceRef::new("prometheus", "uidA")));
    }

    #[test]
    fn unresolved_variable_is_absent() {
        let registry = registry();
        let interpolator = table(&[("ds", "nowhere")]);
        assert!(resolve(&registry, &interpolator, &Reference::Variable("$ds".into()), None).is_none());
        // An unbound variable interpolates to itself and misses too.
        assert!(
            resolve(&registry, &interpolator, &Reference::Variable("$other".into()), None).is_none()
        );
    }

    #[test]
    fn variable_does_not_use_legacy_id() {
        let registry = registry();
        let interpolator = table(&[("ds", "2")]);
        assert!(resolve(&registry, &interpolator, &Reference::Variable("$ds".into()), None).is_none());
    }
}
