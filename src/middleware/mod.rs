//! Middleware for the LAcra auth API
//!
//! Request tracing, rate limiting, and security headers.

mod rate_limiter;
mod security;
mod tracing;

pub use rate_limiter::{rate_limit_layer, RateLimiter};
pub use security::{hsts_header, security_headers};
pub use tracing::request_tracing;
