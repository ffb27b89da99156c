// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connector traits and the boundary traits for external collaborators.
//!
//! The registry never loads plugin bundles, substitutes templates, or fetches
//! settings itself; it calls out through the traits defined here.

pub mod class_loader;
pub mod connector;
pub mod fetch;
pub mod interpolate;
pub mod notify;
pub mod variables;

// Re-export all traits at the traits module level for convenience.
pub use class_loader::ClassLoader;
pub use connector::{
    Connector, ConnectorClass, ConnectorFactory, Constructed, InjectionContext,
    LegacyConnectorFactory, LoadedPlugin,
};
pub use fetch::SettingsFetcher;
pub use interpolate::{ArrayPolicy, Interpolator, PassthroughInterpolator};
pub use notify::{FailureNotifier, TracingNotifier};
pub use variables::{NoVariables, VariableSource};
