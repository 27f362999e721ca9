use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthUser, TokenService};
use crate::error::AppError;
use crate::state::AppState;

/// Requires `Authorization: Bearer <token>` on every request it wraps.
///
/// On success the caller's [`AuthUser`] is inserted into the request extensions
/// for downstream handlers. A missing or malformed header and a token that fails
/// verification are both answered with 403 and the request goes no further.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(TokenService::extract_from_header);

    let Some(token) = token else {
        state.metrics.inc_auth_rejections();
        return Err(AppError::Forbidden("no token given".to_string()));
    };

    match state.tokens.verify(token) {
        Ok(claims) => {
            let user = AuthUser::from(claims);
            tracing::debug!(user_id = %user.id, "authenticated request");
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            state.metrics.inc_auth_rejections();
            Err(e.into())
        }
    }
}
