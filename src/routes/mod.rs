//! HTTP route handlers for the brainvault API.
//!
//! - `users`: signup and signin
//! - `content`: content CRUD for the authenticated user
//! - `settings`: account overview and password change
//! - `brain`: share-link creation and public resolution
//! - `health`: liveness, readiness, metrics and version endpoints

pub mod brain;
pub mod content;
pub mod health;
pub mod settings;
pub mod users;

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware;
use crate::middleware::validation::MAX_BODY_BYTES;
use crate::state::AppState;

/// Builds the full application router: public routes, token-protected routes,
/// and the middleware stack that wraps both.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version))
        .route("/api/v1/signup", post(users::signup))
        .route("/api/v1/signin", post(users::signin))
        .route("/api/v1/brain/{share_link}", get(brain::resolve_share));

    let protected = Router::new()
        .route("/api/v1/content", get(content::list_content).post(content::create_content))
        .route(
            "/api/v1/content/{content_id}",
            put(content::update_content).delete(content::delete_content),
        )
        .route("/api/v1/settings", get(settings::get_settings))
        .route("/api/v1/settings/change_password", post(settings::change_password))
        .route("/api/v1/brain/share", post(brain::create_share))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth::require_auth));

    let cfg = state.config.clone();
    let limiter = state.global_limiter.clone();

    public
        .merge(protected)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(from_fn(middleware::validation::validate_request_middleware))
        .layer(from_fn_with_state(limiter, middleware::rate_limit::rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(cfg, middleware::security_headers::security_headers_middleware))
}
