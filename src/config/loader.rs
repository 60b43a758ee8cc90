//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{SiteConfig, SiteModeConfig};
use crate::config::validation::{validate_config, validate_site_mode, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: SiteConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load and validate a standalone site-mode file.
pub fn load_site_mode(path: &Path) -> Result<SiteModeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mode: SiteModeConfig = toml::from_str(&content)?;

    validate_site_mode(&mode).map_err(ConfigError::Validation)?;

    Ok(mode)
}

/// Write a site-mode section to its standalone file.
///
/// Writes to a sibling temp file first so a watcher never observes a
/// half-written document.
pub fn save_site_mode(path: &Path, mode: &SiteModeConfig) -> Result<(), ConfigError> {
    let rendered = toml::to_string_pretty(mode)?;
    let tmp = path.with_extension("toml.tmp");
    fs::write(&tmp, rendered)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
