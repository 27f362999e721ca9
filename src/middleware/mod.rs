//! Middleware components for HTTP request processing.
//!
//! Cross-cutting concerns layered onto the router: bearer-token authentication,
//! security headers, per-IP rate limiting, request validation and client
//! identification.

pub mod auth;
pub mod ip;
pub mod rate_limit;
pub mod security_headers;
pub mod validation;

pub use rate_limit::EndpointRateLimiter;
