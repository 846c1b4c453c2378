use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Post;

/// Post row joined with its author's public fields, as feed and profile
/// views consume it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithAuthor {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub post_type: String,
    pub visibility: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub display_name: String,
    pub profile_picture: Option<String>,
    pub author_last_active: Option<DateTime<Utc>>,
}

const JOINED_COLUMNS: &str = "p.id, p.author_id, p.content, p.post_type, p.visibility, \
                              p.image_url, p.created_at, u.username, u.display_name, \
                              u.profile_picture, u.last_active AS author_last_active";

pub async fn create_post(
    pool: &PgPool,
    author_id: Uuid,
    content: &str,
    post_type: &str,
    visibility: &str,
    image_url: Option<&str>,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (author_id, content, post_type, visibility, image_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, author_id, content, post_type, visibility, image_url, created_at
        "#,
    )
    .bind(author_id)
    .bind(content)
    .bind(post_type)
    .bind(visibility)
    .bind(image_url)
    .fetch_one(pool)
    .await
}

pub async fn find_post(pool: &PgPool, post_id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        "SELECT id, author_id, content, post_type, visibility, image_url, created_at \
         FROM posts WHERE id = $1",
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
}

/// Every post, newest first. Visibility filtering happens in the handler
/// through the visibility service; the store never pre-filters.
pub async fn list_all(pool: &PgPool) -> Result<Vec<PostWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, PostWithAuthor>(&format!(
        r#"
        SELECT {JOINED_COLUMNS}
        FROM posts p
        JOIN users u ON p.author_id = u.id
        ORDER BY p.created_at DESC
        "#
    ))
    .fetch_all(pool)
    .await
}

/// Every post by one author, newest first; same contract as `list_all`.
pub async fn list_by_author(
    pool: &PgPool,
    author_id: Uuid,
) -> Result<Vec<PostWithAuthor>, sqlx::Error> {
    sqlx::query_as::<_, PostWithAuthor>(&format!(
        r#"
        SELECT {JOINED_COLUMNS}
        FROM posts p
        JOIN users u ON p.author_id = u.id
        WHERE p.author_id = $1
        ORDER BY p.created_at DESC
        "#
    ))
    .bind(author_id)
    .fetch_all(pool)
    .await
}

/// Delete a post with its comments and every like attached to the post or
/// its comments, in one transaction.
pub async fn delete_post_cascading(pool: &PgPool, post_id: Uuid) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM likes WHERE item_type = 'comment' \
         AND item_id IN (SELECT id FROM comments WHERE post_id = $1)",
    )
    .bind(post_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM likes WHERE item_type = 'post' AND item_id = $1")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM comments WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
