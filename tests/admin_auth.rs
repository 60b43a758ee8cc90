//! Login, logout, session checks and the login rate limit.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use portfolio_site::config::SessionScheme;
use serde_json::json;

mod common;
use common::*;

#[tokio::test]
async fn test_login_sets_session_cookie() {
    let (router, state) = app(test_config());

    let response = send(&router, login_request(PASSWORD, "192.0.2.10")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("admin-auth="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=86400"));
    assert!(set_cookie.contains("Path=/"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(state.sessions.active_sessions(), 1);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let (router, _) = app(test_config());

    let response = send(&router, login_request("admin123", "192.0.2.11")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid password");
}

#[tokio::test]
async fn test_malformed_login_body() {
    let (router, _) = app(test_config());

    let request = Request::post("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);

    let response = send(&router, login_request("", "192.0.2.12")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sixth_attempt_is_rate_limited() {
    let (router, _) = app(test_config());

    for _ in 0..5 {
        let response = send(&router, login_request("wrong", "203.0.113.7")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused once the window is full.
    let response = send(&router, login_request(PASSWORD, "203.0.113.7")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after > 0 && retry_after <= 15 * 60);
    assert_eq!(body_json(response).await["success"], false);

    // Other clients are unaffected.
    let response = send(&router, login_request(PASSWORD, "203.0.113.8")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_forwarded_for_ignored_by_default() {
    let (router, _) = app(test_config());

    // Rotating the header does not give one peer a fresh window.
    for i in 0..5 {
        let spoofed = format!("10.9.9.{i}");
        let response = send(&router, forwarded_login_request("wrong", "203.0.113.30", &spoofed)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let response = send(&router, forwarded_login_request("wrong", "203.0.113.30", "10.9.9.99")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_trusted_proxy_keys_on_last_hop() {
    let mut config = test_config();
    config.rate_limit.trust_forwarded_for = true;
    let (router, _) = app(config);

    // Client-supplied leading hops vary; the proxy-appended hop does not.
    for i in 0..5 {
        let chain = format!("10.9.9.{i}, 198.51.100.1");
        let response = send(&router, forwarded_login_request("wrong", "10.0.0.2", &chain)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let response = send(&router, forwarded_login_request("wrong", "10.0.0.2", "10.9.9.99, 198.51.100.1")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Another client behind the same proxy has its own window.
    let response = send(&router, forwarded_login_request(PASSWORD, "10.0.0.2", "198.51.100.2")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_can_be_disabled() {
    let mut config = test_config();
    config.rate_limit.enabled = false;
    let (router, _) = app(config);

    for _ in 0..7 {
        let response = send(&router, login_request("wrong", "203.0.113.9")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_check_reflects_session() {
    let (router, _) = app(test_config());

    let response = send(&router, get("/api/auth/check")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["authenticated"], false);

    let cookie = login(&router).await;
    let response = send(&router, get_with_cookie("/api/auth/check", &cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["subject"], "admin");

    let response = send(&router, get_with_cookie("/api/auth/check", "admin-auth=forged")).await;
    assert_eq!(body_json(response).await["authenticated"], false);
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let (router, state) = app(test_config());
    let cookie = login(&router).await;

    let request = Request::post("/api/auth/logout")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("admin-auth=;"));
    assert!(cleared.contains("Max-Age=0"));
    assert_eq!(state.sessions.active_sessions(), 0);

    // The old cookie no longer opens the admin area.
    let response = send(&router, get_with_cookie("/api/admin/status", &cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session_still_clears_cookie() {
    let (router, _) = app(test_config());

    let request = Request::post("/api/auth/logout").body(Body::empty()).unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::SET_COOKIE));
}

#[tokio::test]
async fn test_sentinel_scheme_accepts_only_literal_value() {
    let mut config = test_config();
    config.session.scheme = SessionScheme::Sentinel;
    let (router, _) = app(config);

    let cookie = login(&router).await;
    assert_eq!(cookie, "admin-auth=authenticated");

    let response = send(&router, get_with_cookie("/api/admin/status", "admin-auth=authenticated")).await;
    assert_eq!(response.status(), StatusCode::OK);

    for forged in ["admin-auth=", "admin-auth=Authenticated", "admin-auth=authenticated1", "other=authenticated"] {
        let response = send(&router, get_with_cookie("/api/admin/status", forged)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{forged}");
    }
}

#[tokio::test]
async fn test_admin_api_requires_session() {
    let (router, _) = app(test_config());

    let response = send(&router, get("/api/admin/status")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "Authentication required");

    let response = send(
        &router,
        json_request("PATCH", "/api/admin/site-mode", json!({ "enabled": true }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_page_redirect_keeps_origin() {
    let (router, _) = app(test_config());

    let response = send(&router, get("/admin/projects")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/admin/login?from=%2Fadmin%2Fprojects");
}

#[tokio::test]
async fn test_login_page_trailing_slash_goes_to_login() {
    let (router, _) = app(test_config());

    let response = send(&router, get("/admin/login/")).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/admin/login");

    let response = send(&router, get("/admin/login/?from=%2Fadmin%2Fprojects")).await;
    assert_eq!(location(&response), "/admin/login?from=%2Fadmin%2Fprojects");

    let response = send(&router, get(&location(&response).to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);
}
