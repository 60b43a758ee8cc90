//! Login, logout and session-check endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::cookie::{clear_session_cookie, read_cookie, session_cookie};
use crate::auth::current_session;
use crate::error::AppError;
use crate::http::response::ApiMessage;
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthStatus {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| AppError::MalformedRequest(e.body_text()))?;
    if request.password.is_empty() {
        return Err(AppError::MalformedRequest("password is required".into()));
    }

    // Argon2 verification is CPU-bound.
    let password = state.admin_password.clone();
    let valid = tokio::task::spawn_blocking(move || password.verify(&request.password))
        .await
        .map_err(|e| AppError::Internal(format!("password check failed: {e}")))?;

    if !valid {
        tracing::warn!("Admin login failed");
        metrics::record_login_attempt("failure");
        return Err(AppError::AuthenticationFailed);
    }

    let token = state.sessions.issue(&state.config.admin.subject);
    let cookie = session_cookie(&state.config.session, &token)
        .map_err(|e| AppError::Internal(format!("invalid session cookie: {e}")))?;

    tracing::info!(subject = %state.config.admin.subject, "Admin logged in");
    metrics::record_login_attempt("success");
    metrics::record_active_sessions(state.sessions.active_sessions());

    Ok((
        [(SET_COOKIE, cookie)],
        Json(ApiMessage::success("Login successful")),
    )
        .into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(value) = read_cookie(&headers, &state.config.session.cookie_name) {
        if state.sessions.revoke(value) {
            tracing::info!("Admin logged out");
        }
    }
    metrics::record_active_sessions(state.sessions.active_sessions());

    // Always clear the cookie, even if no session record existed.
    match clear_session_cookie(&state.config.session) {
        Ok(cookie) => (
            [(SET_COOKIE, cookie)],
            Json(ApiMessage::success("Logged out")),
        )
            .into_response(),
        Err(e) => AppError::Internal(format!("invalid session cookie: {e}")).into_response(),
    }
}

pub async fn check(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthStatus> {
    let session = current_session(&state, &headers);
    Json(AuthStatus {
        authenticated: session.is_some(),
        subject: session.map(|s| s.subject),
    })
}
