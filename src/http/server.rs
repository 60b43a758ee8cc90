//! HTTP server setup.
//!
//! # Responsibilities
//! - Build shared `AppState` from the validated configuration
//! - Create the Axum router with auth, admin and page handlers
//! - Wire up middleware (gate, admin guard, headers, limits, request ID, tracing)
//! - Run background sweeps and apply hot-reloaded site modes until shutdown

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{self, auth::admin_page_auth_middleware};
use crate::auth::{handlers as auth_handlers, password::PasswordError, AdminPassword, SessionStore};
use crate::config::loader::load_site_mode;
use crate::config::validation::validate_site_mode;
use crate::config::{SiteConfig, SiteModeConfig};
use crate::gate::{middleware::site_mode_middleware, SiteModeStore};
use crate::http::pages;
use crate::observability::metrics;
use crate::security::{headers::security_headers, rate_limit::login_rate_limit_middleware, LoginRateLimiter};

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SiteConfig>,
    pub site_mode: Arc<SiteModeStore>,
    pub sessions: Arc<SessionStore>,
    pub admin_password: Arc<AdminPassword>,
    pub login_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// The initial site mode comes from `site_mode_file` when set, otherwise
    /// from the inline section. An unreadable file leaves the store
    /// unavailable and the gate runs in normal mode.
    pub fn from_config(config: SiteConfig) -> Result<Self, PasswordError> {
        let admin_password = AdminPassword::from_config(&config.admin)?;

        let site_mode = match &config.site_mode_file {
            Some(path) => match load_site_mode(Path::new(path)) {
                Ok(mode) => SiteModeStore::new(mode),
                Err(e) => {
                    tracing::warn!(
                        path = %path,
                        error = %e,
                        "Site mode file unavailable, serving in normal mode"
                    );
                    SiteModeStore::unavailable()
                }
            },
            None => SiteModeStore::new(config.site_mode.clone()),
        };

        Ok(Self {
            site_mode: Arc::new(site_mode),
            sessions: Arc::new(SessionStore::from_config(&config.session)),
            admin_password: Arc::new(admin_password),
            login_limiter: Arc::new(LoginRateLimiter::from_config(&config.rate_limit)),
            config: Arc::new(config),
        })
    }
}

/// HTTP server for the portfolio site.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: SiteConfig) -> Result<Self, PasswordError> {
        let state = AppState::from_config(config)?;
        Ok(Self::with_state(state))
    }

    pub fn with_state(state: AppState) -> Self {
        let router = build_router(state.clone());
        Self { router, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Site modes received on `site_mode_updates` are validated and swapped
    /// into the gate. Everything stops when `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        site_mode_updates: mpsc::UnboundedReceiver<SiteModeConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            site_mode_available = self.state.site_mode.snapshot().is_ok(),
            session_scheme = ?self.state.sessions.scheme(),
            "HTTP server starting"
        );

        spawn_limiter_sweep(&self.state, shutdown.resubscribe());
        spawn_session_sweep(&self.state, shutdown.resubscribe());
        spawn_site_mode_updates(&self.state, site_mode_updates, shutdown.resubscribe());

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown requested, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let login = Router::new()
        .route("/api/auth/login", post(auth_handlers::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit_middleware,
        ));

    let mut router = Router::new()
        .route("/api/auth/logout", post(auth_handlers::logout))
        .route("/api/auth/check", get(auth_handlers::check))
        .route("/api/health", get(pages::health))
        .merge(login)
        .merge(admin::setup_admin_router(state.clone()))
        .fallback(pages::fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_page_auth_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            site_mode_middleware,
        ))
        .with_state(state);

    if config.security.enable_headers {
        router = router.layer(security_headers());
    }

    router
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn spawn_limiter_sweep(state: &AppState, mut shutdown: broadcast::Receiver<()>) {
    let limiter = state.login_limiter.clone();
    let period = Duration::from_secs(state.config.rate_limit.sweep_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = limiter.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, "Swept idle rate limit entries");
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    });
}

fn spawn_session_sweep(state: &AppState, mut shutdown: broadcast::Receiver<()>) {
    let sessions = state.sessions.clone();
    let period = Duration::from_secs(state.config.session.sweep_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = sessions.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, "Swept expired sessions");
                        metrics::record_active_sessions(sessions.active_sessions());
                    }
                }
                _ = shutdown.recv() => break,
            }
        }
    });
}

fn spawn_site_mode_updates(
    state: &AppState,
    mut updates: mpsc::UnboundedReceiver<SiteModeConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let store = state.site_mode.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                update = updates.recv() => match update {
                    Some(mode) => match validate_site_mode(&mode) {
                        Ok(()) => store.replace(mode),
                        Err(errors) => {
                            for error in &errors {
                                tracing::error!(error = %error, "Rejected reloaded site mode");
                            }
                        }
                    },
                    None => break,
                },
                _ = shutdown.recv() => break,
            }
        }
    });
}
