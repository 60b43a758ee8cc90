use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::current_session;
use crate::error::AppError;
use crate::http::server::AppState;
use crate::routing::{PathClass, PathClassifier};

/// Admin page that never requires a session.
pub const LOGIN_PATH: &str = "/admin/login";

/// Guards `/api/admin/*`: 401 without a valid session.
pub async fn admin_api_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if current_session(&state, request.headers()).is_some() {
        return next.run(request).await;
    }
    tracing::debug!(path = %request.uri().path(), "Admin API request without session");
    AppError::Unauthorized.into_response()
}

/// Guards admin pages: unauthenticated visitors go to the login page.
pub async fn admin_page_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path();
    let class = match state.site_mode.snapshot() {
        Ok(snapshot) => snapshot.classifier.classify(path),
        Err(_) => PathClassifier::default().classify(path),
    };

    if class != PathClass::Admin
        || path == LOGIN_PATH
        || current_session(&state, request.headers()).is_some()
    {
        return next.run(request).await;
    }

    // `/admin/login/` and friends land on the canonical login page.
    if path.trim_end_matches('/') == LOGIN_PATH {
        let target = match request.uri().query() {
            Some(query) => format!("{LOGIN_PATH}?{query}"),
            None => LOGIN_PATH.to_string(),
        };
        return Redirect::temporary(&target).into_response();
    }

    tracing::debug!(path = %path, "Admin page request without session, redirecting to login");
    Redirect::temporary(&login_redirect(path)).into_response()
}

fn login_redirect(from: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(from.as_bytes()).collect();
    format!("{LOGIN_PATH}?from={encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_encodes_path() {
        assert_eq!(login_redirect("/admin"), "/admin/login?from=%2Fadmin");
        assert_eq!(
            login_redirect("/admin/projects edit"),
            "/admin/login?from=%2Fadmin%2Fprojects+edit"
        );
    }
}
