// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./sources.toml` > `~/.config/tributary/sources.toml` > `/etc/tributary/sources.toml`
//! with environment variable overrides via `TRIBUTARY_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SourcesConfig;

/// System-wide settings file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/tributary/sources.toml";

/// Settings file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "sources.toml";

/// Path of the user settings file under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tributary/sources.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tributary/sources.toml` (system-wide)
/// 3. `~/.config/tributary/sources.toml` (user XDG config)
/// 4. `./sources.toml` (local directory)
/// 5. `TRIBUTARY_*` environment variables
pub fn load_config() -> Result<SourcesConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SourcesConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SourcesConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SourcesConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SourcesConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SourcesConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment overrides for the scalar top-level keys.
///
/// `TRIBUTARY_DEFAULT_SOURCE` and `TRIBUTARY_INCLUDE_BUILTIN_SOURCES` only;
/// source entries come from files.
fn env_provider() -> Env {
    Env::prefixed("TRIBUTARY_").only(&["default_source", "include_builtin_sources"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert!(config.default_source.is_empty());
        assert!(config.include_builtin_sources);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn user_path_ends_with_tributary_sources() {
        if let Some(path) = user_config_path() {
            assert!(path.ends_with("tributary/sources.toml"));
        }
    }
}
