//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::OnceLock;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Request, Response},
    Router,
};
use portfolio_site::auth::password::hash_password;
use portfolio_site::config::{SiteConfig, SiteModeConfig};
use portfolio_site::http::{build_router, AppState};
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery staple";

/// Argon2 hash of [`PASSWORD`], computed once per test binary.
pub fn password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).unwrap()).clone()
}

pub fn test_config() -> SiteConfig {
    let mut config = SiteConfig::default();
    config.admin.password_hash = Some(password_hash());
    config.session.secure_cookie = false;
    config
}

pub fn construction_config() -> SiteConfig {
    let mut config = test_config();
    config.site_mode = SiteModeConfig {
        enabled: true,
        ..Default::default()
    };
    config
}

pub fn app(config: SiteConfig) -> (Router, AppState) {
    let state = AppState::from_config(config).unwrap();
    (build_router(state.clone()), state)
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Login attempt arriving from socket peer `client_ip`.
pub fn login_request(password: &str, client_ip: &str) -> Request<Body> {
    let peer = SocketAddr::new(client_ip.parse().unwrap(), 40_000);
    let mut request = Request::post("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "password": password }).to_string()))
        .unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

/// Login attempt from `client_ip` carrying an `X-Forwarded-For` header.
pub fn forwarded_login_request(password: &str, client_ip: &str, forwarded_for: &str) -> Request<Body> {
    let mut request = login_request(password, client_ip);
    request
        .headers_mut()
        .insert("x-forwarded-for", forwarded_for.parse().unwrap());
    request
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

/// The `name=value` pair from a `Set-Cookie` response header.
pub fn cookie_pair(response: &Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().trim().to_string()
}

/// Log in with the test password and return the session cookie pair.
pub async fn login(router: &Router) -> String {
    let response = send(router, login_request(PASSWORD, "192.0.2.1")).await;
    assert_eq!(response.status(), 200);
    cookie_pair(&response)
}
