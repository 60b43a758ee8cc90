//! Path classification.
//!
//! # Responsibilities
//! - Hold the ordered rule list
//! - Classify a path as Public, Admin, Api or Asset
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - First matching rule wins; unmatched paths are Public
//! - Rebuilt only when the site mode changes

use crate::config::SiteModeConfig;
use crate::routing::matcher::{ExactRule, ExtensionRule, PathRule, PrefixRule};
use crate::routing::PathClass;

/// Prefixes serving build output and static files.
pub const ASSET_PREFIXES: &[&str] = &["/_next/", "/static/"];

/// Ordered rule set.
#[derive(Debug)]
pub struct PathClassifier {
    rules: Vec<Box<dyn PathRule>>,
}

impl PathClassifier {
    /// Build the rule list for a site mode.
    ///
    /// The construction page and every allow-listed prefix classify as
    /// assets so the gate never redirects them.
    pub fn new(mode: &SiteModeConfig) -> Self {
        let mut rules: Vec<Box<dyn PathRule>> = vec![Box::new(PrefixRule::segment(
            "/api",
            PathClass::Api,
        ))];
        for prefix in ASSET_PREFIXES {
            rules.push(Box::new(PrefixRule::new(*prefix, PathClass::Asset)));
        }
        rules.push(Box::new(PrefixRule::new("/admin", PathClass::Admin)));
        rules.push(Box::new(ExactRule::new(
            mode.redirect_path.clone(),
            PathClass::Asset,
        )));
        for prefix in &mode.allowed_prefixes {
            rules.push(Box::new(PrefixRule::new(prefix.clone(), PathClass::Asset)));
        }
        rules.push(Box::new(ExtensionRule::new(PathClass::Asset)));

        Self { rules }
    }

    /// Classify a request path.
    pub fn classify(&self, path: &str) -> PathClass {
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map(|rule| rule.class())
            .unwrap_or(PathClass::Public)
    }
}

impl Default for PathClassifier {
    fn default() -> Self {
        Self::new(&SiteModeConfig::default())
    }
}
