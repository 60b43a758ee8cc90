//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Login request:
//!     → rate_limit.rs (sliding window per client address)
//!     → auth handlers
//!
//! Every response:
//!     → headers.rs (nosniff, frame denial, referrer policy)
//! ```
//!
//! # Design Decisions
//! - Rate limiting covers the login endpoint only
//! - Denied attempts do not extend the window

pub mod headers;
pub mod rate_limit;

pub use rate_limit::{LoginRateLimiter, RateDecision};
