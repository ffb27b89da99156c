// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tributary source registry.

use thiserror::Error;

/// The primary error type used across Tributary crates.
#[derive(Debug, Error)]
pub enum TributaryError {
    /// A reference could not be mapped to registered settings.
    #[error("{key} was not found")]
    NotFound { key: String },

    /// The connector class could not be loaded or instantiated.
    ///
    /// The message intentionally matches [`TributaryError::NotFound`]; the
    /// underlying detail is only reported through the failure notifier.
    #[error("{key} was not found")]
    LoadFailed { key: String },

    /// A runtime source was registered with a uid that already exists.
    #[error("source with uid `{uid}` is already registered")]
    DuplicateUid { uid: String },

    /// A runtime source was registered with a display name that already exists.
    #[error("source named `{name}` is already registered")]
    DuplicateName { name: String },

    /// A runtime source was registered with a legacy id that already exists.
    #[error("source with id {id} is already registered")]
    DuplicateId { id: i64 },

    /// The remote settings payload could not be fetched.
    #[error("settings fetch failed: {0}")]
    Fetch(String),

    /// Configuration errors (invalid TOML, duplicate keys, unknown default).
    #[error("configuration error: {0}")]
    Config(String),

    /// Errors raised by connector class loaders or factories.
    #[error("plugin error: {message}")]
    Plugin {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl TributaryError {
    /// Shorthand for a plugin error without an underlying cause.
    pub fn plugin(message: impl Into<String>) -> Self {
        TributaryError::Plugin {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for both lookup failures and load failures.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TributaryError::NotFound { .. } | TributaryError::LoadFailed { .. }
        )
    }
}
