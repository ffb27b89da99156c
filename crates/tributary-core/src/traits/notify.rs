// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget side channel for connector load failures.

use tracing::error;

/// Receives connector load failures for operator or user visibility.
///
/// Callers of `get` only see a "not found" error; the detail goes here.
pub trait FailureNotifier: Send + Sync + 'static {
    fn notify_load_failure(&self, source_name: &str, detail: &str);
}

/// Notifier that logs failures through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl FailureNotifier for TracingNotifier {
    fn notify_load_failure(&self, source_name: &str, detail: &str) {
        error!(source = source_name, detail = detail, "connector plugin failed to load");
    }
}
