//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLI/env overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!     → site_mode section seeded into the gate's SiteModeStore
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new site mode
//!     → validation.rs validates
//!     → atomic swap of the gate snapshot
//! ```
//!
//! # Design Decisions
//! - Only the site mode is live; everything else requires a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::ConfigError;
pub use schema::{
    AdminConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig, SecurityConfig,
    SessionConfig, SessionScheme, SiteConfig, SiteModeConfig, TimeoutConfig,
};
