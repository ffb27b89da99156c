// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed settings fetcher.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use tributary_core::{SettingsFetcher, SettingsPayload, TributaryError};

use crate::diagnostic::into_tributary_error;

/// Re-reads a sources TOML file on every fetch, so editing the file and
/// calling `reload` picks up the change.
#[derive(Debug, Clone)]
pub struct FileSettingsFetcher {
    path: PathBuf,
}

impl FileSettingsFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsFetcher for FileSettingsFetcher {
    async fn fetch_settings(&self) -> Result<SettingsPayload, TributaryError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            TributaryError::Fetch(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let name = self.path.display().to_string();
        let config = crate::validate_source(&name, &content)
            .map_err(|errors| into_tributary_error(&errors))?;
        let payload = config.to_payload();
        debug!(
            path = %self.path.display(),
            sources = payload.sources.len(),
            "fetched settings from file"
        );
        Ok(payload)
    }
}
