// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Tributary source resolution.
//!
//! This crate provides the data model for registered sources, the connector
//! capability traits, the boundary traits for external collaborators (class
//! loading, interpolation, variables, settings fetch, failure notification),
//! and the shared error type.

pub mod builtin;
pub mod error;
pub mod instance;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TributaryError;
pub use instance::{PatchedConnector, SourceInstance};
pub use types::{
    DatasourceVariable, PluginMeta, ScopedVars, SettingsPayload, SourceLookup, SourceRef,
    SourceSettings, VariableValue,
};

pub use traits::{
    ArrayPolicy, ClassLoader, Connector, ConnectorClass, ConnectorFactory, Constructed,
    FailureNotifier, InjectionContext, Interpolator, LegacyConnectorFactory, LoadedPlugin,
    NoVariables, PassthroughInterpolator, SettingsFetcher, TracingNotifier, VariableSource,
};
