// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings configuration for the Tributary source registry.
//!
//! Provides TOML parsing of source settings with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, miette diagnostics with typo suggestions, and a file-backed
//! [`SettingsFetcher`](tributary_core::SettingsFetcher).
//!
//! # Usage
//!
//! ```no_run
//! use tributary_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! let payload = config.to_payload();
//! println!("default source: {}", payload.default_source);
//! ```

pub mod diagnostic;
pub mod fetcher;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use fetcher::FileSettingsFetcher;
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{MetaConfig, SourceConfig, SourcesConfig};

/// Load configuration from the XDG hierarchy and validate it.
///
/// Figment errors are converted into diagnostics with typo suggestions;
/// on success the semantic validation runs and collects every failure.
pub fn load_and_validate() -> Result<SourcesConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<SourcesConfig, Vec<ConfigError>> {
    validate_source("<inline>", toml_content)
}

/// Parse and validate TOML content, naming it `name` in diagnostics.
pub(crate) fn validate_source(
    name: &str,
    toml_content: &str,
) -> Result<SourcesConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![(name.to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(loader::LOCAL_CONFIG_PATH) {
        let path = std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG_PATH).display().to_string())
            .unwrap_or_else(|_| loader::LOCAL_CONFIG_PATH.to_string());
        sources.push((path, content));
    }

    if let Some(path) = loader::user_config_path()
        && let Ok(content) = std::fs::read_to_string(&path)
    {
        sources.push((path.display().to_string(), content));
    }

    let system_path = std::path::Path::new(loader::SYSTEM_CONFIG_PATH);
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}
