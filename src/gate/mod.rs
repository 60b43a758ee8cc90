//! Site-mode gate.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → store.rs (current SiteSnapshot, or ConfigurationUnavailable)
//!     → SiteState (Normal | Construction)
//!     → classifier (Public | Admin | Api | Asset)
//!     → GateDecision (Pass | Redirect)
//! ```
//!
//! # Design Decisions
//! - Re-evaluated per request from the current snapshot; no hysteresis
//! - Unreadable configuration means Normal, so visitors are never locked out
//! - Only Public paths are ever redirected

pub mod middleware;
pub mod store;

pub use middleware::site_mode_middleware;
pub use store::{SiteModeStore, SiteSnapshot};

use thiserror::Error;

use crate::observability::metrics;
use crate::routing::PathClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("site mode configuration unavailable")]
    ConfigurationUnavailable,
}

/// Whether public content is currently replaced by the construction page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteState {
    Normal,
    Construction,
}

impl SiteState {
    pub fn of(snapshot: &SiteSnapshot) -> Self {
        if snapshot.mode.enabled {
            SiteState::Construction
        } else {
            SiteState::Normal
        }
    }
}

/// What the gate does with one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Hand the request to the next handler unchanged.
    Pass,
    /// Redirect to the given same-site path.
    Redirect(String),
}

/// Decide a request path against a snapshot.
pub fn decide(snapshot: &SiteSnapshot, path: &str) -> GateDecision {
    match SiteState::of(snapshot) {
        SiteState::Normal => GateDecision::Pass,
        SiteState::Construction => {
            let class = snapshot.classifier.classify(path);
            if class.bypasses_construction() || path == snapshot.mode.redirect_path {
                GateDecision::Pass
            } else {
                debug_assert_eq!(class, PathClass::Public);
                GateDecision::Redirect(snapshot.mode.redirect_path.clone())
            }
        }
    }
}

/// Decide a request path against whatever the store currently holds.
///
/// A missing snapshot fails open to [`SiteState::Normal`].
pub fn evaluate(store: &SiteModeStore, path: &str) -> GateDecision {
    match store.snapshot() {
        Ok(snapshot) => decide(&snapshot, path),
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "Site mode unreadable, treating site as normal");
            metrics::record_gate_config_unavailable();
            GateDecision::Pass
        }
    }
}
