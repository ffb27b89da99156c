// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tributary integration tests.
//!
//! Provides mock collaborators and a test harness for fast, deterministic
//! tests without real plugin bundles or a settings backend.
//!
//! # Components
//!
//! - [`MockClassLoader`] - Class loader with pre-registered plugins, load counters, and delays
//! - [`MockTemplateVars`] - Template variables acting as interpolator and variable source
//! - [`RecordingNotifier`] - Captures load-failure notifications
//! - [`StaticFetcher`] - Settings fetcher with a settable payload
//! - [`TestHarness`] - A wired [`tributary_registry::SourceService`]

pub mod fixtures;
pub mod harness;
pub mod mock_collaborators;
pub mod mock_loader;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_collaborators::{scoped_vars, MockTemplateVars, RecordingNotifier, StaticFetcher};
pub use mock_loader::{BareConnector, FactoryOutput, MockClassLoader, TestConnector, TestFactory};
