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
    middleware::validation::{validate_uuid, ValidatedJson},
    models::{CreateContentRequest, UpdateContentRequest},
    state::AppState,
};

pub async fn list_content(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Value>> {
    let content = db::contents_for_user(&state.db, &user.id).await?;
    Ok(Json(json!({ "content": content })))
}

pub async fn create_content(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateContentRequest>,
) -> AppResult<Json<Value>> {
    let id = Uuid::new_v4().to_string();

    let mut tx = state.db.begin().await?;
    let tags = db::resolve_tags(&mut tx, &req.tags).await?;
    sqlx::query("INSERT INTO contents (id, link, type, title, user_id) VALUES (?1, ?2, ?3, ?4, ?5)")
        .bind(&id)
        .bind(&req.link)
        .bind(req.kind.as_str())
        .bind(&req.title)
        .bind(&user.id)
        .execute(&mut *tx)
        .await?;
    db::set_content_tags(&mut tx, &id, &tags).await?;
    tx.commit().await?;

    state.metrics.inc_contents_created();
    tracing::info!(user_id = %user.id, content_id = %id, tags = tags.len(), "content added");
    Ok(Json(json!({ "message": "content added", "id": id })))
}

pub async fn update_content(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(content_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateContentRequest>,
) -> AppResult<Json<Value>> {
    validate_uuid(&content_id, "content")?;
    if req.is_empty() {
        return Err(AppError::BadRequest("no fields to update".to_string()));
    }

    let mut tx = state.db.begin().await?;
    let res = sqlx::query(
        r#"UPDATE contents
           SET link = COALESCE(?1, link), type = COALESCE(?2, type), title = COALESCE(?3, title)
           WHERE id = ?4 AND user_id = ?5"#,
    )
    .bind(req.link.as_deref())
    .bind(req.kind.map(|k| k.as_str()))
    .bind(req.title.as_deref())
    .bind(&content_id)
    .bind(&user.id)
    .execute(&mut *tx)
    .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("content not found".to_string()));
    }

    if let Some(titles) = &req.tags {
        let tags = db::resolve_tags(&mut tx, titles).await?;
        db::set_content_tags(&mut tx, &content_id, &tags).await?;
    }
    tx.commit().await?;

    let data = db::owned_content(&state.db, &content_id, &user.id).await?.ok_or_not_found("content")?;
    state.metrics.inc_contents_updated();
    tracing::info!(user_id = %user.id, content_id = %content_id, "content updated");
    Ok(Json(json!({ "message": "content updated", "data": data })))
}

pub async fn delete_content(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(content_id): Path<String>,
) -> AppResult<Json<Value>> {
    validate_uuid(&content_id, "content")?;

    let mut tx = state.db.begin().await?;
    sqlx::query(
        r#"DELETE FROM content_tags
           WHERE content_id IN (SELECT id FROM contents WHERE id = ?1 AND user_id = ?2)"#,
    )
    .bind(&content_id)
    .bind(&user.id)
    .execute(&mut *tx)
    .await?;
    let res = sqlx::query("DELETE FROM contents WHERE id = ?1 AND user_id = ?2")
        .bind(&content_id)
        .bind(&user.id)
        .execute(&mut *tx)
        .await?;
    if res.rows_affected() == 0 {
        // Either missing or owned by someone else; both look the same to the caller.
        return Err(AppError::NotFound("content not found".to_string()));
    }
    tx.commit().await?;

    state.metrics.inc_contents_deleted();
    tracing::info!(user_id = %user.id, content_id = %content_id, "content deleted");
    Ok(Json(json!({ "message": "deleted content successfully" })))
}
