use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    db,
    error::{AppError, AppResult, OptionExt},
    hashnum::hashnum,
    state::AppState,
};

fn share_url(state: &AppState, hash: &str) -> String {
    format!("{}{}", state.config.share.base_url, hash)
}

/// Publishes the caller's collection. Repeated calls return the same hash.
pub async fn create_share(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let existing: Option<String> = sqlx::query_scalar("SELECT hash FROM links WHERE user_id = ?1")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?;
    if let Some(hash) = existing {
        return Ok(Json(json!({
            "message": "link already exists",
            "hash": hash,
            "link": share_url(&state, &hash),
        })));
    }

    let username: String = sqlx::query_scalar("SELECT username FROM users WHERE id = ?1")
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_not_found("user")?;
    let hash = hashnum(&username);

    let owner: Option<String> = sqlx::query_scalar("SELECT user_id FROM links WHERE hash = ?1")
        .bind(&hash)
        .fetch_optional(&state.db)
        .await?;
    if owner.is_some_and(|owner| owner != user.id) {
        tracing::warn!(user_id = %user.id, %hash, "share hash already owned by another user");
        return Err(AppError::Conflict("share hash collides with an existing link".to_string()));
    }

    // A concurrent request for the same user may have won; keep whichever row exists.
    sqlx::query("INSERT INTO links (id, hash, user_id) VALUES (?1, ?2, ?3) ON CONFLICT(user_id) DO NOTHING")
        .bind(Uuid::new_v4().to_string())
        .bind(&hash)
        .bind(&user.id)
        .execute(&state.db)
        .await?;
    let hash: String = sqlx::query_scalar("SELECT hash FROM links WHERE user_id = ?1")
        .bind(&user.id)
        .fetch_one(&state.db)
        .await?;

    state.metrics.inc_shares_created();
    tracing::info!(user_id = %user.id, %hash, "brain shared");
    Ok(Json(json!({ "hash": hash, "link": share_url(&state, &hash) })))
}

/// Public, read-only view of a shared collection.
///
/// Unknown hashes and empty collections answer 200 with a `message`, which is
/// what existing share pages expect.
pub async fn resolve_share(State(state): State<AppState>, Path(share_link): Path<String>) -> AppResult<Json<Value>> {
    let link: Option<(String, String)> = sqlx::query_as(
        r#"SELECT l.user_id, u.username
           FROM links l JOIN users u ON u.id = l.user_id
           WHERE l.hash = ?1"#,
    )
    .bind(&share_link)
    .fetch_optional(&state.db)
    .await?;

    let Some((user_id, username)) = link else {
        return Ok(Json(json!({ "message": "can't find the link" })));
    };

    let content = db::contents_for_user(&state.db, &user_id).await?;
    if content.is_empty() {
        return Ok(Json(json!({ "message": "can't find the content/ maybe it was deleted" })));
    }

    state.metrics.inc_share_views();
    Ok(Json(json!({ "username": username, "content": content })))
}
