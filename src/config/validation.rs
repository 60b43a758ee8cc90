//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Reject redirect targets that would leave the site
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system, and on every admin
//!   site-mode update

use std::net::SocketAddr;

use argon2::PasswordHash;
use thiserror::Error;

use crate::config::schema::{SiteConfig, SiteModeConfig};

/// A single semantic problem with a configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate the whole configuration.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if let Err(mode_errors) = validate_site_mode(&config.site_mode) {
        errors.extend(mode_errors);
    }

    if let Some(hash) = &config.admin.password_hash {
        if PasswordHash::new(hash).is_err() {
            errors.push(ValidationError::new(
                "admin.password_hash",
                "not a valid PHC password hash string",
            ));
        }
    }
    if matches!(&config.admin.password, Some(p) if p.is_empty()) {
        errors.push(ValidationError::new("admin.password", "must not be empty"));
    }

    let cookie_name = &config.session.cookie_name;
    if cookie_name.is_empty()
        || !cookie_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        errors.push(ValidationError::new(
            "session.cookie_name",
            "must be non-empty and contain only ASCII letters, digits, '-' or '_'",
        ));
    }
    if config.session.ttl_secs == 0 {
        errors.push(ValidationError::new("session.ttl_secs", "must be greater than 0"));
    }
    if config.session.sweep_interval_secs == 0 {
        errors.push(ValidationError::new(
            "session.sweep_interval_secs",
            "must be greater than 0",
        ));
    }

    if config.rate_limit.login_max_attempts == 0 {
        errors.push(ValidationError::new(
            "rate_limit.login_max_attempts",
            "must be greater than 0",
        ));
    }
    if config.rate_limit.login_window_secs == 0 {
        errors.push(ValidationError::new(
            "rate_limit.login_window_secs",
            "must be greater than 0",
        ));
    }
    if config.rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::new(
            "rate_limit.sweep_interval_secs",
            "must be greater than 0",
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!(
                "'{}' is not a socket address",
                config.observability.metrics_address
            ),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a site-mode section on its own.
pub fn validate_site_mode(mode: &SiteModeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(message) = check_local_path(&mode.redirect_path) {
        errors.push(ValidationError::new("site_mode.redirect_path", message));
    } else if mode.redirect_path.starts_with("/api") || mode.redirect_path.starts_with("/admin") {
        errors.push(ValidationError::new(
            "site_mode.redirect_path",
            "must point at a public page, not an API or admin path",
        ));
    }

    for prefix in &mode.allowed_prefixes {
        if let Err(message) = check_local_path(prefix) {
            errors.push(ValidationError::new(
                "site_mode.allowed_prefixes",
                format!("'{prefix}': {message}"),
            ));
        } else if prefix == "/" {
            errors.push(ValidationError::new(
                "site_mode.allowed_prefixes",
                "'/' would allow every path",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A same-origin absolute path: starts with one '/', no scheme, no whitespace.
fn check_local_path(path: &str) -> Result<(), &'static str> {
    if !path.starts_with('/') {
        return Err("must start with '/'");
    }
    if path.starts_with("//") || path.starts_with("/\\") {
        return Err("must not be protocol-relative");
    }
    if path.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("must not contain whitespace or control characters");
    }
    Ok(())
}
