//! Admin authentication.
//!
//! # Data Flow
//! ```text
//! POST /api/auth/login
//!     → security::rate_limit (per-client window)
//!     → password.rs (Argon2 verify)
//!     → session.rs (issue cookie value)
//!     → cookie.rs (Set-Cookie)
//!
//! Any admin request:
//!     → cookie.rs (read admin-auth)
//!     → session.rs (verify)
//! ```

pub mod cookie;
pub mod handlers;
pub mod password;
pub mod session;

pub use password::AdminPassword;
pub use session::{Session, SessionStatus, SessionStore, SENTINEL};

use axum::http::HeaderMap;

use crate::http::server::AppState;

/// Resolve the admin session carried by a request, if any.
pub fn current_session(state: &AppState, headers: &HeaderMap) -> Option<Session> {
    let value = cookie::read_cookie(headers, &state.config.session.cookie_name);
    state.sessions.lookup(value)
}
