use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{ContentItem, ContentRow, ContentTagRow, ContentType, Owner, Tag};

pub async fn init_db(pool: &SqlitePool) -> anyhow::Result<()> {
    // Pragmas for better durability/performance
    if let Err(e) = sqlx::query("PRAGMA journal_mode=WAL;").execute(pool).await {
        tracing::warn!("Failed to set WAL journal mode: {}", e);
    }
    if let Err(e) = sqlx::query("PRAGMA synchronous=NORMAL;").execute(pool).await {
        tracing::warn!("Failed to set synchronous mode: {}", e);
    }
    // Foreign keys are critical - fail if this doesn't work
    sqlx::query("PRAGMA foreign_keys=ON;").execute(pool).await?;

    if let Err(e) = sqlx::query("PRAGMA busy_timeout=10000;").execute(pool).await {
        tracing::warn!("Failed to set busy_timeout: {}", e);
    }

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now'))
        )"#,
    )
    .execute(pool)
    .await?;

    // Titles are unique so find-or-create can upsert instead of racing.
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS tags (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL UNIQUE
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS contents (
            id TEXT PRIMARY KEY,
            link TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('image', 'article', 'video', 'audio', 'tweet')),
            title TEXT NOT NULL,
            user_id TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS content_tags (
            content_id TEXT NOT NULL,
            tag_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (content_id, tag_id),
            FOREIGN KEY(content_id) REFERENCES contents(id) ON DELETE CASCADE,
            FOREIGN KEY(tag_id) REFERENCES tags(id)
        )"#,
    )
    .execute(pool)
    .await?;

    // One share record per user
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS links (
            id TEXT PRIMARY KEY,
            hash TEXT NOT NULL UNIQUE,
            user_id TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ','now')),
            FOREIGN KEY(user_id) REFERENCES users(id) ON DELETE CASCADE
        )"#,
    )
    .execute(pool)
    .await?;

    let indexes = [
        ("idx_contents_user", "CREATE INDEX IF NOT EXISTS idx_contents_user ON contents(user_id, created_at)"),
        ("idx_content_tags_tag", "CREATE INDEX IF NOT EXISTS idx_content_tags_tag ON content_tags(tag_id)"),
    ];

    for (name, query) in indexes {
        if let Err(e) = sqlx::query(query).execute(pool).await {
            match &e {
                sqlx::Error::Database(db_err) => {
                    let msg = db_err.message().to_lowercase();
                    if msg.contains("already exists") || msg.contains("duplicate") {
                        tracing::debug!("Index {} already exists, skipping", name);
                    } else {
                        tracing::warn!("Failed to create index {}: {}", name, e);
                    }
                }
                _ => {
                    tracing::warn!("Failed to create index {}: {}", name, e);
                }
            }
        }
    }

    Ok(())
}

/// Finds or creates a tag per title, preserving request order and dropping repeats.
pub async fn resolve_tags(conn: &mut SqliteConnection, titles: &[String]) -> AppResult<Vec<Tag>> {
    let mut tags: Vec<Tag> = Vec::with_capacity(titles.len());
    for title in titles {
        if tags.iter().any(|t| &t.title == title) {
            continue;
        }
        sqlx::query("INSERT INTO tags (id, title) VALUES (?1, ?2) ON CONFLICT(title) DO NOTHING")
            .bind(Uuid::new_v4().to_string())
            .bind(title)
            .execute(&mut *conn)
            .await?;
        let tag: Tag = sqlx::query_as("SELECT id, title FROM tags WHERE title = ?1")
            .bind(title)
            .fetch_one(&mut *conn)
            .await?;
        tags.push(tag);
    }
    Ok(tags)
}

/// Replaces the tag set of a content item.
pub async fn set_content_tags(conn: &mut SqliteConnection, content_id: &str, tags: &[Tag]) -> AppResult<()> {
    sqlx::query("DELETE FROM content_tags WHERE content_id = ?1")
        .bind(content_id)
        .execute(&mut *conn)
        .await?;
    for (position, tag) in tags.iter().enumerate() {
        sqlx::query("INSERT INTO content_tags (content_id, tag_id, position) VALUES (?1, ?2, ?3)")
            .bind(content_id)
            .bind(&tag.id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

const CONTENT_SELECT: &str = r#"SELECT c.id, c.link, c.type AS kind, c.title, c.user_id, u.username, c.created_at
    FROM contents c JOIN users u ON u.id = c.user_id"#;

/// All content owned by `user_id`, oldest first, with owner and tags resolved.
pub async fn contents_for_user(pool: &SqlitePool, user_id: &str) -> AppResult<Vec<ContentItem>> {
    let rows: Vec<ContentRow> =
        sqlx::query_as(&format!("{} WHERE c.user_id = ?1 ORDER BY c.created_at, c.rowid", CONTENT_SELECT))
            .bind(user_id)
            .fetch_all(pool)
            .await?;

    let tag_rows: Vec<ContentTagRow> = sqlx::query_as(
        r#"SELECT ct.content_id, t.id, t.title
           FROM content_tags ct
           JOIN tags t ON t.id = ct.tag_id
           JOIN contents c ON c.id = ct.content_id
           WHERE c.user_id = ?1
           ORDER BY ct.content_id, ct.position"#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    assemble(rows, tag_rows)
}

/// A single content item, only if `user_id` owns it.
pub async fn owned_content(pool: &SqlitePool, content_id: &str, user_id: &str) -> AppResult<Option<ContentItem>> {
    let row: Option<ContentRow> =
        sqlx::query_as(&format!("{} WHERE c.id = ?1 AND c.user_id = ?2", CONTENT_SELECT))
            .bind(content_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    let Some(row) = row else {
        return Ok(None);
    };

    let tag_rows: Vec<ContentTagRow> = sqlx::query_as(
        r#"SELECT ct.content_id, t.id, t.title
           FROM content_tags ct
           JOIN tags t ON t.id = ct.tag_id
           WHERE ct.content_id = ?1
           ORDER BY ct.position"#,
    )
    .bind(content_id)
    .fetch_all(pool)
    .await?;

    Ok(assemble(vec![row], tag_rows)?.pop())
}

fn assemble(rows: Vec<ContentRow>, tag_rows: Vec<ContentTagRow>) -> AppResult<Vec<ContentItem>> {
    let mut tags_by_content: HashMap<String, Vec<Tag>> = HashMap::new();
    for tr in tag_rows {
        tags_by_content.entry(tr.content_id).or_default().push(Tag { id: tr.id, title: tr.title });
    }

    rows.into_iter()
        .map(|row| {
            let kind: ContentType = row
                .kind
                .parse()
                .map_err(|e: String| AppError::Internal(anyhow::anyhow!("content {}: {}", row.id, e)))?;
            let tags = tags_by_content.remove(&row.id).unwrap_or_default();
            Ok(ContentItem {
                id: row.id,
                link: row.link,
                kind,
                title: row.title,
                tags,
                owner: Owner { id: row.user_id, username: row.username },
                created_at: row.created_at,
            })
        })
        .collect()
}
