//! Path classification subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → classifier.rs (ordered rule scan)
//!     → matcher.rs (evaluate a single rule)
//!     → Return: PathClass (Public when nothing matched)
//!
//! Rule Compilation (on site-mode change):
//!     SiteModeConfig
//!     → fixed rules + construction path + allow-listed prefixes
//!     → Freeze as immutable PathClassifier
//! ```
//!
//! # Design Decisions
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always yields the same class
//! - First match wins

pub mod classifier;
pub mod matcher;

pub use classifier::PathClassifier;

use serde::Serialize;

/// Category of a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathClass {
    /// Site content shown to visitors.
    Public,
    /// Admin dashboard pages.
    Admin,
    /// JSON endpoints under `/api`.
    Api,
    /// Build output, static files and allow-listed paths.
    Asset,
}

impl PathClass {
    /// Paths the construction gate never redirects.
    pub fn bypasses_construction(self) -> bool {
        !matches!(self, PathClass::Public)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PathClass::Public => "public",
            PathClass::Admin => "admin",
            PathClass::Api => "api",
            PathClass::Asset => "asset",
        }
    }
}
