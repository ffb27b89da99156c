// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote settings fetch boundary used by `reload`.

use async_trait::async_trait;

use crate::error::TributaryError;
use crate::types::SettingsPayload;

/// Fetches a fresh registry payload. The wire shape belongs to the implementor.
#[async_trait]
pub trait SettingsFetcher: Send + Sync + 'static {
    async fn fetch_settings(&self) -> Result<SettingsPayload, TributaryError>;
}
