//! Live site-mode snapshot.

use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::config::SiteModeConfig;
use crate::gate::GateError;
use crate::routing::PathClassifier;

/// A site mode together with the classifier compiled for it.
#[derive(Debug)]
pub struct SiteSnapshot {
    pub mode: SiteModeConfig,
    pub classifier: PathClassifier,
}

impl SiteSnapshot {
    pub fn new(mode: SiteModeConfig) -> Self {
        let classifier = PathClassifier::new(&mode);
        Self { mode, classifier }
    }
}

/// Process-wide holder of the current site mode.
///
/// Readers take a lock-free snapshot per request; writers swap in a whole
/// new snapshot. An empty store means the configuration could not be read.
#[derive(Debug, Default)]
pub struct SiteModeStore {
    current: ArcSwapOption<SiteSnapshot>,
}

impl SiteModeStore {
    pub fn new(mode: SiteModeConfig) -> Self {
        Self {
            current: ArcSwapOption::from_pointee(SiteSnapshot::new(mode)),
        }
    }

    /// A store whose configuration failed to load.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Result<Arc<SiteSnapshot>, GateError> {
        self.current
            .load_full()
            .ok_or(GateError::ConfigurationUnavailable)
    }

    /// Replace the current mode.
    pub fn replace(&self, mode: SiteModeConfig) {
        tracing::info!(
            enabled = mode.enabled,
            redirect_path = %mode.redirect_path,
            allowed_prefixes = ?mode.allowed_prefixes,
            "Site mode updated"
        );
        self.current.store(Some(Arc::new(SiteSnapshot::new(mode))));
    }

    /// Forget the current mode; the gate falls back to normal operation.
    pub fn mark_unavailable(&self) {
        self.current.store(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_and_snapshot() {
        let store = SiteModeStore::new(SiteModeConfig::default());
        assert!(!store.snapshot().unwrap().mode.enabled);

        let before = store.snapshot().unwrap();
        store.replace(SiteModeConfig {
            enabled: true,
            ..SiteModeConfig::default()
        });
        assert!(store.snapshot().unwrap().mode.enabled);
        // Earlier readers keep their own snapshot.
        assert!(!before.mode.enabled);
    }

    #[test]
    fn test_unavailable() {
        let store = SiteModeStore::unavailable();
        assert!(matches!(
            store.snapshot(),
            Err(GateError::ConfigurationUnavailable)
        ));

        store.replace(SiteModeConfig::default());
        assert!(store.snapshot().is_ok());

        store.mark_unavailable();
        assert!(store.snapshot().is_err());
    }
}
