// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin class loading boundary.

use async_trait::async_trait;

use crate::error::TributaryError;
use crate::traits::connector::LoadedPlugin;
use crate::types::PluginMeta;

/// Turns plugin metadata into a constructible connector class.
///
/// Implementations own bundle resolution, caching of bundles, and any
/// timeouts. The instance loader awaits this exactly once per cache miss.
#[async_trait]
pub trait ClassLoader: Send + Sync + 'static {
    async fn load_connector_class(&self, meta: &PluginMeta) -> Result<LoadedPlugin, TributaryError>;
}
