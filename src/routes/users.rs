use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    auth::password::{hash_password_async, verify_password_async},
    error::{AppError, AppResult},
    middleware::ip::{extract_ip_from_headers, MaybeRemoteAddr},
    middleware::validation::{sanitize_for_logging, ValidatedJson},
    models::{SigninRequest, SignupRequest, UserRow},
    state::{AppState, SIGNIN_ENDPOINT, SIGNUP_ENDPOINT},
};

pub async fn signup(
    State(state): State<AppState>,
    remote: MaybeRemoteAddr,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> AppResult<Json<Value>> {
    let ip = extract_ip_from_headers(&headers, remote.ip(), state.config.rate_limit.trust_proxy_headers);
    state.rate_limiter.check_endpoint_limit(SIGNUP_ENDPOINT, ip).await?;

    let password_hash = hash_password_async(req.password.clone()).await?;
    let id = Uuid::new_v4().to_string();

    let res = sqlx::query("INSERT INTO users (id, email, username, password) VALUES (?1, ?2, ?3, ?4)")
        .bind(&id)
        .bind(&req.email)
        .bind(&req.username)
        .bind(&password_hash)
        .execute(&state.db)
        .await;

    // The client only ever learns that signup failed, not which field collided.
    if let Err(e) = res {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                tracing::info!(
                    "signup rejected for {}: email or username taken",
                    sanitize_for_logging(&req.username)
                );
                return Err(AppError::Internal(anyhow::anyhow!("error creating user: duplicate account")));
            }
        }
        return Err(AppError::Internal(anyhow::anyhow!("error creating user: {}", e)));
    }

    state.metrics.inc_signups();
    tracing::info!(user_id = %id, "user signed up");
    Ok(Json(json!({ "message": "signup successful" })))
}

pub async fn signin(
    State(state): State<AppState>,
    remote: MaybeRemoteAddr,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<SigninRequest>,
) -> AppResult<Json<Value>> {
    let ip = extract_ip_from_headers(&headers, remote.ip(), state.config.rate_limit.trust_proxy_headers);
    state.rate_limiter.check_endpoint_limit(SIGNIN_ENDPOINT, ip).await?;

    let user: Option<UserRow> = match (req.username.as_deref(), req.email.as_deref()) {
        (Some(username), _) => {
            sqlx::query_as("SELECT id, email, username, password FROM users WHERE username = ?1")
                .bind(username)
                .fetch_optional(&state.db)
                .await?
        }
        (None, Some(email)) => {
            sqlx::query_as("SELECT id, email, username, password FROM users WHERE email = ?1")
                .bind(email)
                .fetch_optional(&state.db)
                .await?
        }
        (None, None) => {
            return Err(AppError::ValidationError {
                field: "username".to_string(),
                message: "username or email is required".to_string(),
            });
        }
    };

    let Some(user) = user else {
        state.metrics.inc_signin_failures();
        return Err(AppError::Forbidden("no user found".to_string()));
    };

    if !verify_password_async(req.password, user.password.clone()).await? {
        state.metrics.inc_signin_failures();
        return Err(AppError::Forbidden("wrong password".to_string()));
    }

    let token = state.tokens.issue(&user.id)?;
    state.metrics.inc_signins();
    tracing::info!(user_id = %user.id, "user signed in");
    Ok(Json(json!({ "token": token })))
}
