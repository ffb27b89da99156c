// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings registry for one generation of registered sources.
//!
//! The `Registry` stores `SourceSettings` records indexed three ways: by uid,
//! by display name, and by legacy numeric id. All three maps are built
//! together and never updated in place once a generation is published.

use std::collections::HashMap;
use std::sync::Arc;

use tributary_core::builtin::expression_settings;
use tributary_core::types::{DEFAULT_MARKER, EXPRESSION_LEGACY_UID, EXPRESSION_UID};
use tributary_core::{SourceSettings, TributaryError};

/// One generation of source settings.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    by_name: HashMap<String, Arc<SourceSettings>>,
    /// Insertion order of `by_name`.
    names: Vec<String>,
    by_uid: HashMap<String, Arc<SourceSettings>>,
    by_id: HashMap<i64, Arc<SourceSettings>>,
    default_source: String,
}

impl Registry {
    /// Build a registry from settings records and the default identifier.
    ///
    /// Empty uids are defaulted to the name. The expression pseudo-source is
    /// registered under both its canonical and its legacy sentinel uid.
    pub fn new(
        sources: impl IntoIterator<Item = SourceSettings>,
        default_source: impl Into<String>,
    ) -> Self {
        let mut registry = Self {
            default_source: default_source.into(),
            ..Self::default()
        };
        for settings in sources {
            registry.insert(settings);
        }

        let expression = Arc::new(expression_settings());
        registry
            .by_uid
            .insert(EXPRESSION_UID.to_string(), expression.clone());
        registry
            .by_uid
            .insert(EXPRESSION_LEGACY_UID.to_string(), expression);
        registry
    }

    fn insert(&mut self, mut settings: SourceSettings) {
        if settings.uid.is_empty() {
            settings.uid = settings.name.clone();
        }
        let settings = Arc::new(settings);

        if self
            .by_name
            .insert(settings.name.clone(), settings.clone())
            .is_none()
        {
            self.names.push(settings.name.clone());
        }
        self.by_uid.insert(settings.uid.clone(), settings.clone());
        if let Some(id) = settings.id {
            self.by_id.insert(id, settings);
        }
    }

    /// Returns a copy of this registry with one more source.
    ///
    /// Fails if the uid (after defaulting), the name or the legacy id is
    /// already registered, so every key keeps mapping to one record.
    pub fn with_source(&self, mut settings: SourceSettings) -> Result<Self, TributaryError> {
        if settings.uid.is_empty() {
            settings.uid = settings.name.clone();
        }
        if self.by_uid.contains_key(&settings.uid) {
            return Err(TributaryError::DuplicateUid { uid: settings.uid });
        }
        if self.by_name.contains_key(&settings.name) {
            return Err(TributaryError::DuplicateName {
                name: settings.name,
            });
        }
        if let Some(id) = settings.id
            && self.by_id.contains_key(&id)
        {
            return Err(TributaryError::DuplicateId { id });
        }
        let mut next = self.clone();
        next.insert(settings);
        Ok(next)
    }

    pub fn get_by_uid(&self, uid: &str) -> Option<&SourceSettings> {
        self.by_uid.get(uid).map(Arc::as_ref)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&SourceSettings> {
        self.by_name.get(name).map(Arc::as_ref)
    }

    pub fn get_by_id(&self, id: i64) -> Option<&SourceSettings> {
        self.by_id.get(&id).map(Arc::as_ref)
    }

    /// Literal lookup: uid first, then name, then legacy numeric id.
    pub fn lookup(&self, token: &str) -> Option<&SourceSettings> {
        self.get_by_uid(token)
            .or_else(|| self.get_by_name(token))
            .or_else(|| token.parse::<i64>().ok().and_then(|id| self.get_by_id(id)))
    }

    /// Uid or name lookup without the legacy id fallback.
    pub fn lookup_uid_or_name(&self, token: &str) -> Option<&SourceSettings> {
        self.get_by_uid(token).or_else(|| self.get_by_name(token))
    }

    /// The stored default identifier (uid or name).
    pub fn default_source(&self) -> &str {
        &self.default_source
    }

    /// The default identifier, or `None` if it is unset or would point back
    /// at the default marker itself.
    pub fn default_key(&self) -> Option<&str> {
        match self.default_source.as_str() {
            "" | DEFAULT_MARKER => None,
            key => Some(key),
        }
    }

    /// Settings of the default source: by uid first, then by name.
    pub fn default_settings(&self) -> Option<&SourceSettings> {
        self.lookup_uid_or_name(&self.default_source)
    }

    /// Maps a display name to its record's uid.
    pub fn uid_for_name(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(|s| s.uid.as_str())
    }

    /// All named records in insertion order.
    pub fn get_all(&self) -> impl Iterator<Item = &SourceSettings> {
        self.names
            .iter()
            .filter_map(|name| self.by_name.get(name).map(Arc::as_ref))
    }

    /// Number of named records (excludes the expression pseudo-source).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
