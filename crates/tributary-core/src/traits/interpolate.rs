// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template substitution boundary.

use crate::types::ScopedVars;

/// How a multi-valued variable collapses into a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayPolicy {
    /// Use only the first selected value.
    FirstOfArray,
}

impl ArrayPolicy {
    pub fn apply(self, values: &[String]) -> String {
        match self {
            ArrayPolicy::FirstOfArray => values.first().cloned().unwrap_or_default(),
        }
    }
}

/// Synchronous template substitution.
pub trait Interpolator: Send + Sync + 'static {
    fn interpolate(&self, token: &str, scope: Option<&ScopedVars>, policy: ArrayPolicy) -> String;
}

/// Interpolator that returns every token unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughInterpolator;

impl Interpolator for PassthroughInterpolator {
    fn interpolate(&self, token: &str, _scope: Option<&ScopedVars>, _policy: ArrayPolicy) -> String {
        token.to_string()
    }
}
