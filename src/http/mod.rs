//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, limits)
//!     → gate::middleware (construction-mode redirect)
//!     → admin::auth (admin page guard)
//!     → handlers (auth, admin, pages.rs)
//!     → response.rs (JSON message bodies)
//! ```

pub mod pages;
pub mod response;
pub mod server;

pub use server::{build_router, AppState, HttpServer};
