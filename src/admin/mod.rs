//! Admin surface: session-guarded JSON API and admin pages.
//!
//! # Routes
//! ```text
//! GET   /api/admin/status     → handlers::get_status
//! GET   /api/admin/site-mode  → handlers::get_site_mode
//! PATCH /api/admin/site-mode  → handlers::update_site_mode
//! GET   /admin/login          → login page (no session needed)
//! GET   /admin, /admin/*      → dashboard (page guard redirects to login)
//! ```

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::admin_api_auth_middleware;
use self::handlers::{get_site_mode, get_status, update_site_mode};
use crate::http::pages;
use crate::http::server::AppState;

pub fn setup_admin_router(state: AppState) -> Router<AppState> {
    let api = Router::new()
        .route("/api/admin/status", get(get_status))
        .route(
            "/api/admin/site-mode",
            get(get_site_mode).patch(update_site_mode),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            admin_api_auth_middleware,
        ));

    let pages = Router::new()
        .route(auth::LOGIN_PATH, get(pages::admin_login_page))
        .route("/admin", get(pages::admin_dashboard))
        .route("/admin/{*rest}", get(pages::admin_dashboard));

    api.merge(pages)
}
