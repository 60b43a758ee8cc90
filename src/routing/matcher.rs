//! Path matching rules.
//!
//! # Responsibilities
//! - Match path prefixes (case-sensitive)
//! - Match exact paths
//! - Detect file extensions in the last path segment
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Prefix matching only, no wildcards or regex
//! - Rules are pure; no allocation in `matches`

use crate::routing::PathClass;

/// Trait for classifying a request path.
pub trait PathRule: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this rule.
    fn matches(&self, path: &str) -> bool;

    /// Class assigned when the rule matches.
    fn class(&self) -> PathClass;
}

/// Matches a path prefix.
#[derive(Debug, Clone)]
pub struct PrefixRule {
    prefix: String,
    class: PathClass,
    segment_boundary: bool,
}

impl PrefixRule {
    /// Plain string prefix: `/admin` matches `/admin`, `/admin/x` and `/admin-login`.
    pub fn new(prefix: impl Into<String>, class: PathClass) -> Self {
        Self {
            prefix: prefix.into(),
            class,
            segment_boundary: false,
        }
    }

    /// Prefix that must end on a segment boundary: `/api` matches `/api` and
    /// `/api/login` but not `/apiary`.
    pub fn segment(prefix: impl Into<String>, class: PathClass) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_end_matches('/').to_string();
        Self {
            prefix,
            class,
            segment_boundary: true,
        }
    }
}

impl PathRule for PrefixRule {
    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) if self.segment_boundary => rest.is_empty() || rest.starts_with('/'),
            Some(_) => true,
            None => false,
        }
    }

    fn class(&self) -> PathClass {
        self.class
    }
}

/// Matches one exact path.
#[derive(Debug, Clone)]
pub struct ExactRule {
    path: String,
    class: PathClass,
}

impl ExactRule {
    pub fn new(path: impl Into<String>, class: PathClass) -> Self {
        Self {
            path: path.into(),
            class,
        }
    }
}

impl PathRule for ExactRule {
    fn matches(&self, path: &str) -> bool {
        path == self.path
    }

    fn class(&self) -> PathClass {
        self.class
    }
}

/// Matches paths whose last segment carries a file extension (`/favicon.ico`).
#[derive(Debug, Clone)]
pub struct ExtensionRule {
    class: PathClass,
}

impl ExtensionRule {
    pub fn new(class: PathClass) -> Self {
        Self { class }
    }
}

impl PathRule for ExtensionRule {
    fn matches(&self, path: &str) -> bool {
        let last = path.rsplit('/').next().unwrap_or(path);
        matches!(last.rsplit_once('.'), Some((_, ext)) if !ext.is_empty())
    }

    fn class(&self) -> PathClass {
        self.class
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_prefix() {
        let rule = PrefixRule::new("/admin", PathClass::Admin);
        assert!(rule.matches("/admin"));
        assert!(rule.matches("/admin/dashboard"));
        assert!(rule.matches("/admin-login"));
        assert!(!rule.matches("/Admin"));
        assert!(!rule.matches("/projects/admin"));
    }

    #[test]
    fn test_segment_prefix() {
        let rule = PrefixRule::segment("/api/", PathClass::Api);
        assert!(rule.matches("/api"));
        assert!(rule.matches("/api/"));
        assert!(rule.matches("/api/login"));
        assert!(!rule.matches("/apiary"));
    }

    #[test]
    fn test_exact() {
        let rule = ExactRule::new("/under-construction", PathClass::Asset);
        assert!(rule.matches("/under-construction"));
        assert!(!rule.matches("/under-construction/x"));
    }

    #[test]
    fn test_extension() {
        let rule = ExtensionRule::new(PathClass::Asset);
        assert!(rule.matches("/favicon.ico"));
        assert!(rule.matches("/images/me.v2.png"));
        assert!(rule.matches("/.env"));
        assert!(!rule.matches("/projects"));
        assert!(!rule.matches("/v1.2/notes"));
        assert!(!rule.matches("/trailing."));
        assert!(!rule.matches("/"));
    }
}
