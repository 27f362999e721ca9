use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::middleware::rate_limit::RateLimiter;
use crate::middleware::EndpointRateLimiter;

/// Route keys used with [`EndpointRateLimiter`].
pub const SIGNUP_ENDPOINT: &str = "/api/v1/signup";
pub const SIGNIN_ENDPOINT: &str = "/api/v1/signin";

/// The shared application state.
///
/// Cloned into every handler by Axum; all members are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool, created once at startup.
    pub db: sqlx::SqlitePool,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Signs and verifies bearer tokens with the configured secret.
    pub tokens: TokenService,
    /// Request and domain counters.
    pub metrics: Metrics,
    /// Per-IP limiter applied to every request.
    pub global_limiter: RateLimiter,
    /// Tighter per-IP limits on the credential endpoints.
    pub rate_limiter: EndpointRateLimiter,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// The endpoint limiter gets `rate_limit.auth_max_requests` per minute for
    /// signup and signin; the global limiter uses `rate_limit.max_requests` per
    /// `rate_limit.window_seconds`.
    pub fn new(db: sqlx::SqlitePool, config: AppConfig) -> Self {
        let auth_max = config.rate_limit.auth_max_requests;
        let rate_limiter = EndpointRateLimiter::new()
            .with_limits(vec![(SIGNUP_ENDPOINT, auth_max, 60), (SIGNIN_ENDPOINT, auth_max, 60)]);
        let global_limiter = RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window_seconds)
            .trusting_proxy_headers(config.rate_limit.trust_proxy_headers);
        let tokens = TokenService::from_config(&config.auth);

        Self { db, config: Arc::new(config), tokens, metrics: Metrics::new(), global_limiter, rate_limiter }
    }
}
