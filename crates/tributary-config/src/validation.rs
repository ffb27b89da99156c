// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for source settings.
//!
//! Checks the uniqueness and reference constraints the registry relies on,
//! which serde attributes cannot express.

use std::collections::HashSet;

use tributary_core::builtin::builtin_sources;
use tributary_core::types::DEFAULT_MARKER;

use crate::diagnostic::ConfigError;
use crate::model::SourcesConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SourcesConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let mut names = HashSet::new();
    let mut uids = HashSet::new();
    let mut ids = HashSet::new();

    for (index, source) in config.sources.iter().enumerate() {
        if source.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("sources[{index}].name must not be empty"),
            });
            continue;
        }

        if source.source_type.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("sources[{index}].type must not be empty for `{}`", source.name),
            });
        }

        if !names.insert(source.name.as_str()) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate source name `{}`", source.name),
            });
        }

        let uid = source.effective_uid();
        if !uids.insert(uid) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate source uid `{uid}`"),
            });
        }

        if let Some(id) = source.id
            && !ids.insert(id)
        {
            errors.push(ConfigError::Validation {
                message: format!("duplicate source id {id}"),
            });
        }
    }

    let default = config.default_source.as_str();
    if !default.is_empty() && default != DEFAULT_MARKER {
        let known = config
            .sources
            .iter()
            .any(|s| s.name == default || s.effective_uid() == default)
            || (config.include_builtin_sources
                && builtin_sources().iter().any(|s| s.name == default));
        if !known {
            errors.push(ConfigError::Validation {
                message: format!("default_source `{default}` does not match any source uid or name"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
