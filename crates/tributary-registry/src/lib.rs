// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source registry, reference resolver, lazy connector loader, and listing.
//!
//! A [`SourceService`] holds one registry generation at a time. References in
//! any alias form (uid, display name, legacy id, `{type, uid}` reference, or
//! `$variable` token) resolve to settings through [`resolver`], and
//! [`SourceService::get`] turns them into memoized connector instances. A new
//! generation from `init` or `reload` starts with an empty instance cache.

pub mod cache;
pub mod list;
pub mod loader;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod state;

pub use cache::InstanceCache;
pub use list::{list, ListFilters, SourcePredicate, TypeFilter};
pub use loader::InstanceLoader;
pub use registry::Registry;
pub use resolver::{resolve, Reference};
pub use service::{SourceService, SourceServiceBuilder};
pub use state::{Generation, ResolverState};
