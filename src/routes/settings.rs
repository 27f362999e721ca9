use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::{
    auth::{
        password::{hash_password_async, verify_password_async},
        AuthUser,
    },
    error::{AppError, AppResult, OptionExt},
    middleware::validation::ValidatedJson,
    models::{ChangePasswordRequest, SettingsResponse},
    state::AppState,
};

pub async fn get_settings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<SettingsResponse>> {
    let (username, email): (String, String) = sqlx::query_as("SELECT username, email FROM users WHERE id = ?1")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("user")?;

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contents WHERE user_id = ?1")
        .bind(&user.id)
        .fetch_one(&state.db)
        .await?;

    let hash: Option<String> = sqlx::query_scalar("SELECT hash FROM links WHERE user_id = ?1")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?;

    Ok(Json(SettingsResponse { username, email, links, is_shared: hash.is_some(), hash }))
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<Value>> {
    let current: String = sqlx::query_scalar("SELECT password FROM users WHERE id = ?1")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("user")?;

    if !verify_password_async(req.old_pwd, current).await? {
        return Err(AppError::Forbidden("wrong password".to_string()));
    }

    let new_hash = hash_password_async(req.new_pwd).await?;
    sqlx::query("UPDATE users SET password = ?1 WHERE id = ?2")
        .bind(&new_hash)
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    tracing::info!(user_id = %user.id, "password changed");
    Ok(Json(json!({ "message": "password updated" })))
}
