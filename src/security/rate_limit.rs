//! Sliding-window rate limiting for the login endpoint.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allow,
    /// Denied; the oldest attempt leaves the window after `retry_after`.
    Deny { retry_after: Duration },
}

/// Per-client sliding window of attempt timestamps.
///
/// Each client's prune-check-record sequence runs under that client's map
/// entry lock, so concurrent attempts from one address cannot overshoot the
/// limit. Counters live in this process only; separate instances limit
/// independently.
#[derive(Debug)]
pub struct LoginRateLimiter {
    attempts: DashMap<String, VecDeque<Instant>>,
    max_attempts: usize,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new(max_attempts: usize, window: Duration) -> Self {
        Self {
            attempts: DashMap::new(),
            max_attempts,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.login_max_attempts,
            Duration::from_secs(config.login_window_secs),
        )
    }

    /// Check and record an attempt for `client` now.
    pub fn check(&self, client: &str) -> RateDecision {
        self.check_at(client, Instant::now())
    }

    /// Check and record an attempt for `client` at `now`.
    ///
    /// Timestamps older than the window are dropped first. Denied attempts
    /// are not recorded.
    pub fn check_at(&self, client: &str, now: Instant) -> RateDecision {
        let mut entry = self.attempts.entry(client.to_string()).or_default();
        let window = self.window;
        while entry
            .front()
            .is_some_and(|first| now.saturating_duration_since(*first) >= window)
        {
            entry.pop_front();
        }

        if entry.len() >= self.max_attempts {
            let retry_after = entry
                .front()
                .map(|first| window.saturating_sub(now.saturating_duration_since(*first)))
                .unwrap_or(window);
            return RateDecision::Deny { retry_after };
        }

        entry.push_back(now);
        RateDecision::Allow
    }

    /// Drop clients with no attempts left inside the window.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.attempts.len();
        let window = self.window;
        self.attempts.retain(|_, timestamps| {
            timestamps
                .back()
                .is_some_and(|last| now.saturating_duration_since(*last) < window)
        });
        before.saturating_sub(self.attempts.len())
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.attempts.len()
    }
}

/// Key identifying the client behind a request.
///
/// Uses the socket peer. Behind a reverse proxy (`trust_forwarded`), the
/// last `X-Forwarded-For` hop is the address the proxy itself appended;
/// earlier hops are client-supplied and never used.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    if trust_forwarded {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware applying the login limiter.
pub async fn login_rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.rate_limit.enabled {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(
        request.headers(),
        peer,
        state.config.rate_limit.trust_forwarded_for,
    );

    match state.login_limiter.check(&key) {
        RateDecision::Allow => next.run(request).await,
        RateDecision::Deny { retry_after } => {
            tracing::warn!(client = %key, retry_after = ?retry_after, "Login rate limit exceeded");
            metrics::record_rate_limited("login");
            AppError::RateLimitExceeded {
                retry_after_secs: retry_after.as_secs().max(1),
            }
            .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(15 * 60);

    #[test]
    fn test_sixth_attempt_denied() {
        let limiter = LoginRateLimiter::new(5, WINDOW);
        let start = Instant::now();
        for i in 0..5 {
            let at = start + Duration::from_secs(i * 10);
            assert_eq!(limiter.check_at("10.0.0.1", at), RateDecision::Allow);
        }
        assert!(matches!(
            limiter.check_at("10.0.0.1", start + Duration::from_secs(60)),
            RateDecision::Deny { .. }
        ));
    }

    #[test]
    fn test_window_slides() {
        let limiter = LoginRateLimiter::new(5, WINDOW);
        let start = Instant::now();
        for _ in 0..5 {
            assert_eq!(limiter.check_at("10.0.0.1", start), RateDecision::Allow);
        }
        assert!(matches!(
            limiter.check_at("10.0.0.1", start + WINDOW - Duration::from_secs(1)),
            RateDecision::Deny { .. }
        ));
        assert_eq!(
            limiter.check_at("10.0.0.1", start + WINDOW + Duration::from_secs(1)),
            RateDecision::Allow
        );
    }

    #[test]
    fn test_partial_slide_frees_one_slot() {
        let limiter = LoginRateLimiter::new(5, WINDOW);
        let start = Instant::now();
        for i in 0..5 {
            limiter.check_at("c", start + Duration::from_secs(i * 60));
        }
        // Only the first attempt has aged out.
        let later = start + WINDOW + Duration::from_secs(1);
        assert_eq!(limiter.check_at("c", later), RateDecision::Allow);
        assert!(matches!(limiter.check_at("c", later), RateDecision::Deny { .. }));
    }

    #[test]
    fn test_retry_after_counts_down_from_oldest() {
        let limiter = LoginRateLimiter::new(1, WINDOW);
        let start = Instant::now();
        limiter.check_at("c", start);
        let decision = limiter.check_at("c", start + Duration::from_secs(100));
        assert_eq!(
            decision,
            RateDecision::Deny {
                retry_after: WINDOW - Duration::from_secs(100)
            }
        );
    }

    #[test]
    fn test_denied_attempts_not_recorded() {
        let limiter = LoginRateLimiter::new(2, WINDOW);
        let start = Instant::now();
        limiter.check_at("c", start);
        limiter.check_at("c", start);
        for _ in 0..10 {
            limiter.check_at("c", start + Duration::from_secs(1));
        }
        // Both recorded attempts expire together; nothing denied was kept.
        assert_eq!(limiter.check_at("c", start + WINDOW), RateDecision::Allow);
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = LoginRateLimiter::new(1, WINDOW);
        let now = Instant::now();
        assert_eq!(limiter.check_at("a", now), RateDecision::Allow);
        assert!(matches!(limiter.check_at("a", now), RateDecision::Deny { .. }));
        assert_eq!(limiter.check_at("b", now), RateDecision::Allow);
    }

    #[test]
    fn test_sweep_drops_idle_clients() {
        let limiter = LoginRateLimiter::new(5, WINDOW);
        let start = Instant::now();
        limiter.check_at("old", start);
        limiter.check_at("new", start + Duration::from_secs(600));
        assert_eq!(limiter.tracked_clients(), 2);

        assert_eq!(limiter.sweep_at(start + WINDOW), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_client_key() {
        let mut headers = HeaderMap::new();
        let peer: SocketAddr = "192.0.2.7:5555".parse().unwrap();
        assert_eq!(client_key(&headers, Some(peer), true), "192.0.2.7");
        assert_eq!(client_key(&headers, None, true), "unknown");

        headers.insert("x-forwarded-for", "203.0.113.9, 198.51.100.4".parse().unwrap());
        assert_eq!(client_key(&headers, Some(peer), true), "198.51.100.4");
        assert_eq!(client_key(&headers, Some(peer), false), "192.0.2.7");

        headers.insert("x-forwarded-for", "198.51.100.4".parse().unwrap());
        assert_eq!(client_key(&headers, Some(peer), true), "198.51.100.4");

        headers.insert("x-forwarded-for", " , ".parse().unwrap());
        assert_eq!(client_key(&headers, Some(peer), true), "192.0.2.7");
    }
}
