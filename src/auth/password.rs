//! Admin password verification (Argon2id).

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier as _,
};
use thiserror::Error;

use crate::config::AdminConfig;

/// Used when no password or hash is configured.
pub const FALLBACK_PASSWORD: &str = "admin123";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid password hash: {0}")]
    InvalidHash(String),
    #[error("failed to hash password: {0}")]
    Hashing(String),
}

/// Where the configured credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    ConfiguredHash,
    ConfiguredPassword,
    Fallback,
}

/// Holds the admin password hash and checks submitted passwords against it.
#[derive(Debug, Clone)]
pub struct AdminPassword {
    phc: String,
    source: CredentialSource,
}

impl AdminPassword {
    /// Build from the admin config: `password_hash`, then `password`, then
    /// [`FALLBACK_PASSWORD`].
    pub fn from_config(config: &AdminConfig) -> Result<Self, PasswordError> {
        if let Some(hash) = &config.password_hash {
            return Self::from_hash(hash);
        }
        match &config.password {
            Some(password) => Ok(Self {
                phc: hash_password(password)?,
                source: CredentialSource::ConfiguredPassword,
            }),
            None => {
                tracing::warn!(
                    "No admin password configured; using the built-in fallback. \
                     Set ADMIN_PASSWORD or admin.password_hash before exposing this site."
                );
                Ok(Self {
                    phc: hash_password(FALLBACK_PASSWORD)?,
                    source: CredentialSource::Fallback,
                })
            }
        }
    }

    /// Wrap an existing PHC hash string.
    pub fn from_hash(phc: &str) -> Result<Self, PasswordError> {
        PasswordHash::new(phc).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;
        Ok(Self {
            phc: phc.to_string(),
            source: CredentialSource::ConfiguredHash,
        })
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Check a submitted password.
    pub fn verify(&self, candidate: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.phc) else {
            return false;
        };
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Hash a password into a PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}
