//! Configuration file watcher for hot reload of the site mode.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, load_site_mode, ConfigError};
use crate::config::schema::SiteModeConfig;

/// Which document the watched path holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchTarget {
    /// The full site configuration; only its `site_mode` section is forwarded.
    SiteConfig,
    /// A standalone site-mode file.
    SiteModeFile,
}

impl WatchTarget {
    fn load(self, path: &Path) -> Result<SiteModeConfig, ConfigError> {
        match self {
            WatchTarget::SiteConfig => load_config(path).map(|config| config.site_mode),
            WatchTarget::SiteModeFile => load_site_mode(path),
        }
    }
}

/// A watcher that monitors a configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    target: WatchTarget,
    update_tx: mpsc::UnboundedSender<SiteModeConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for site-mode updates.
    pub fn new(
        path: &Path,
        target: WatchTarget,
    ) -> (Self, mpsc::UnboundedReceiver<SiteModeConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                target,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The parent directory is watched rather than the file, so saves that
    /// replace the file by rename keep being seen and a file that does not
    /// exist yet is picked up once created. The returned watcher must be kept
    /// alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();
        let target = self.target;
        let file_name = self.path.file_name().map(|name| name.to_os_string());

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_file = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().is_some() && p.file_name() == file_name.as_deref());
                    if touches_file && (event.kind.is_modify() || event.kind.is_create()) {
                        tracing::info!(path = ?path, "Config file change detected, reloading...");
                        match target.load(&path) {
                            Ok(mode) => {
                                let _ = tx.send(mode);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload config: {}. Keeping current site mode.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watch_dir(&self.path), RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, target = ?self.target, "Config watcher started");
        Ok(watcher)
    }
}

/// Directory holding `path`; a bare file name lives in the working directory.
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
