//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the portfolio site.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Optional standalone file holding the `site_mode` section.
    ///
    /// When set, the file overrides the inline section, is watched for
    /// changes and receives admin updates.
    pub site_mode_file: Option<String>,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Under-construction mode settings.
    pub site_mode: SiteModeConfig,

    /// Admin credentials.
    pub admin: AdminConfig,

    /// Session cookie settings.
    pub session: SessionConfig,

    /// Login rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Site-wide "under construction" switch.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteModeConfig {
    /// Redirect public pages to `redirect_path` when true.
    pub enabled: bool,

    /// Target of the construction redirect.
    pub redirect_path: String,

    /// Extra path prefixes that always pass through the gate.
    pub allowed_prefixes: Vec<String>,
}

impl Default for SiteModeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            redirect_path: "/under-construction".to_string(),
            allowed_prefixes: Vec::new(),
        }
    }
}

/// Admin dashboard credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Subject recorded on issued sessions.
    pub subject: String,

    /// Plain admin password, hashed at startup. Usually set via `ADMIN_PASSWORD`.
    #[serde(skip_serializing)]
    pub password: Option<String>,

    /// Argon2 PHC string; takes precedence over `password`.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            subject: "admin".to_string(),
            password: None,
            password_hash: None,
        }
    }
}

/// How the session cookie value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionScheme {
    /// Random token validated against the in-memory session store.
    #[default]
    Opaque,
    /// The literal value `authenticated`, for cookies issued by older deployments.
    Sentinel,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub scheme: SessionScheme,

    /// Cookie name.
    pub cookie_name: String,

    /// Session lifetime in seconds (also the cookie Max-Age).
    pub ttl_secs: u64,

    /// Add the `Secure` attribute. Disable only for plain-HTTP development.
    pub secure_cookie: bool,

    /// Interval between expired-session sweeps in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scheme: SessionScheme::Opaque,
            cookie_name: "admin-auth".to_string(),
            ttl_secs: 24 * 60 * 60,
            secure_cookie: true,
            sweep_interval_secs: 300,
        }
    }
}

/// Login rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting on the login endpoint.
    pub enabled: bool,

    /// Attempts allowed per client inside one window.
    pub login_max_attempts: usize,

    /// Sliding window length in seconds.
    pub login_window_secs: u64,

    /// Key clients by the last `X-Forwarded-For` hop instead of the socket
    /// peer. Only enable behind a reverse proxy that appends that header.
    pub trust_forwarded_for: bool,

    /// Interval between sweeps of idle client entries in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            login_max_attempts: 5,
            login_window_secs: 15 * 60,
            trust_forwarded_for: false,
            sweep_interval_secs: 60,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "portfolio_site=debug,tower_http=debug".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 64 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();
        assert!(!config.site_mode.enabled);
        assert_eq!(config.site_mode.redirect_path, "/under-construction");
        assert_eq!(config.session.cookie_name, "admin-auth");
        assert_eq!(config.session.ttl_secs, 86_400);
        assert_eq!(config.rate_limit.login_max_attempts, 5);
        assert_eq!(config.rate_limit.login_window_secs, 900);
        assert!(!config.rate_limit.trust_forwarded_for);
    }

    #[test]
    fn test_partial_sections() {
        let config: SiteConfig = toml::from_str(
            r#"
            [site_mode]
            enabled = true
            allowed_prefixes = ["/resume"]

            [session]
            scheme = "sentinel"
            secure_cookie = false
            "#,
        )
        .unwrap();
        assert!(config.site_mode.enabled);
        assert_eq!(config.site_mode.redirect_path, "/under-construction");
        assert_eq!(config.site_mode.allowed_prefixes, vec!["/resume".to_string()]);
        assert_eq!(config.session.scheme, SessionScheme::Sentinel);
        assert!(!config.session.secure_cookie);
        assert_eq!(config.session.cookie_name, "admin-auth");
    }

    #[test]
    fn test_admin_secrets_not_serialized() {
        let mut config = SiteConfig::default();
        config.admin.password = Some("hunter2".into());
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("hunter2"));
    }
}
