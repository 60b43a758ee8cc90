//! Admin sessions.
//!
//! Two cookie schemes are supported:
//! - `Opaque`: login issues a random 256-bit token. Only its SHA-256 digest is
//!   kept server-side, together with the subject and issue time.
//! - `Sentinel`: the cookie value itself is the credential and must equal
//!   [`SENTINEL`]. Kept for cookies issued by older deployments; anyone able
//!   to set a cookie on the domain can forge it.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::{SessionConfig, SessionScheme};

/// Cookie value accepted by the sentinel scheme.
pub const SENTINEL: &str = "authenticated";

/// A live admin session.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub subject: String,
    /// Seconds since the Unix epoch.
    pub issued_at: u64,
    #[serde(skip)]
    issued_instant: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Authenticated,
    Unauthenticated,
}

impl SessionStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionStatus::Authenticated)
    }
}

/// Issues and verifies session cookie values.
#[derive(Debug)]
pub struct SessionStore {
    scheme: SessionScheme,
    ttl: Duration,
    /// Keyed by hex SHA-256 of the token.
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new(scheme: SessionScheme, ttl: Duration) -> Self {
        Self {
            scheme,
            ttl,
            sessions: DashMap::new(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.scheme, Duration::from_secs(config.ttl_secs))
    }

    pub fn scheme(&self) -> SessionScheme {
        self.scheme
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a session for `subject` and return the cookie value.
    pub fn issue(&self, subject: &str) -> String {
        self.issue_at(subject, Instant::now())
    }

    pub fn issue_at(&self, subject: &str, now: Instant) -> String {
        match self.scheme {
            SessionScheme::Sentinel => SENTINEL.to_string(),
            SessionScheme::Opaque => {
                let mut bytes = [0u8; 32];
                rand::thread_rng().fill(&mut bytes);
                let token = hex::encode(bytes);

                let issued_at = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs();
                self.sessions.insert(
                    hash_token(&token),
                    Session {
                        subject: subject.to_string(),
                        issued_at,
                        issued_instant: now,
                    },
                );
                token
            }
        }
    }

    /// Verify a cookie value.
    pub fn verify(&self, cookie: Option<&str>) -> SessionStatus {
        self.verify_at(cookie, Instant::now())
    }

    pub fn verify_at(&self, cookie: Option<&str>, now: Instant) -> SessionStatus {
        if self.lookup_at(cookie, now).is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Unauthenticated
        }
    }

    /// Resolve a cookie value to its session, if valid.
    pub fn lookup(&self, cookie: Option<&str>) -> Option<Session> {
        self.lookup_at(cookie, Instant::now())
    }

    /// Resolve a cookie value to its session as of `now`.
    ///
    /// Sentinel cookies carry no subject; they resolve to a session for
    /// `"admin"` with an unknown issue time.
    pub fn lookup_at(&self, cookie: Option<&str>, now: Instant) -> Option<Session> {
        let value = cookie.filter(|v| !v.is_empty())?;

        match self.scheme {
            SessionScheme::Sentinel => {
                let matches: bool = value.as_bytes().ct_eq(SENTINEL.as_bytes()).into();
                matches.then(|| Session {
                    subject: "admin".to_string(),
                    issued_at: 0,
                    issued_instant: now,
                })
            }
            SessionScheme::Opaque => {
                let key = hash_token(value);
                let session = self.sessions.get(&key)?.clone();
                if now.saturating_duration_since(session.issued_instant) < self.ttl {
                    Some(session)
                } else {
                    self.sessions.remove(&key);
                    None
                }
            }
        }
    }

    /// Destroy the session behind a cookie value. Returns true if one existed.
    pub fn revoke(&self, cookie: &str) -> bool {
        match self.scheme {
            SessionScheme::Sentinel => false,
            SessionScheme::Opaque => self.sessions.remove(&hash_token(cookie)).is_some(),
        }
    }

    /// Remove expired sessions.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions
            .retain(|_, s| now.saturating_duration_since(s.issued_instant) < ttl);
        before.saturating_sub(self.sessions.len())
    }

    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Server-side sessions currently held.
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
