//! Portfolio site request gate.
//!
//! Classifies request paths, redirects public traffic while the site is
//! under construction, guards the admin surface with a cookie session and
//! rate-limits login attempts per client address.

pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::SiteConfig;
pub use error::AppError;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
