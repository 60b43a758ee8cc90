//! Portfolio site server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id / trace / timeout / body limit
//!                          │
//!                          ▼
//!                    ┌──────────────┐   construction mode,
//!                    │  site gate   │── public path ──────▶ 307 /under-construction
//!                    └──────┬───────┘
//!                           ▼
//!                    ┌──────────────┐   /admin* without
//!                    │ admin guard  │── session ──────────▶ 307 /admin/login?from=
//!                    └──────┬───────┘
//!                           ▼
//!          ┌────────────────┼─────────────────┐
//!          ▼                ▼                 ▼
//!     /api/auth/*      /api/admin/*       pages / fallback
//!   (rate limited)   (session required)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use portfolio_site::config::loader::load_config;
use portfolio_site::config::validation::validate_config;
use portfolio_site::config::watcher::{ConfigWatcher, WatchTarget};
use portfolio_site::config::SiteConfig;
use portfolio_site::lifecycle::{shutdown_signal, Shutdown};
use portfolio_site::observability::{logging, metrics};
use portfolio_site::HttpServer;

#[derive(Parser)]
#[command(name = "portfolio-site")]
#[command(about = "Portfolio site with under-construction gate and admin login", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "SITE_CONFIG")]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Admin password, hashed at startup.
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SiteConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(password) = cli.admin_password {
        config.admin.password = Some(password);
    }

    logging::init_logging(&config.observability)?;
    tracing::info!("portfolio-site v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(error = %error, "Invalid configuration");
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        construction = config.site_mode.enabled,
        session_scheme = ?config.session.scheme,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics exporter");
        }
    }

    // Hot reload: the standalone site-mode file if configured, otherwise
    // the site_mode section of the main config file.
    let watch = match (&config.site_mode_file, &cli.config) {
        (Some(file), _) => Some((PathBuf::from(file), WatchTarget::SiteModeFile)),
        (None, Some(path)) => Some((path.clone(), WatchTarget::SiteConfig)),
        (None, None) => None,
    };
    let (_watcher, site_mode_updates) = match watch {
        Some((path, target)) => {
            let (watcher, updates) = ConfigWatcher::new(&path, target);
            match watcher.run() {
                Ok(handle) => (Some(handle), updates),
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Config watcher unavailable, hot reload disabled");
                    (None, updates)
                }
            }
        }
        None => (None, tokio::sync::mpsc::unbounded_channel().1),
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let mut server_task =
        tokio::spawn(server.run(listener, site_mode_updates, shutdown.subscribe()));

    tokio::select! {
        _ = shutdown_signal() => {
            shutdown.trigger();
            server_task.await??;
        }
        result = &mut server_task => result??,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
