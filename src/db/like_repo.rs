use sqlx::PgPool;
use uuid::Uuid;

/// Toggle a like: remove it if present, insert it otherwise.
/// Returns true when the item ends up liked.
pub async fn toggle_like(
    pool: &PgPool,
    user_id: Uuid,
    item_type: &str,
    item_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let removed = sqlx::query(
        "DELETE FROM likes WHERE user_id = $1 AND item_type = $2 AND item_id = $3",
    )
    .bind(user_id)
    .bind(item_type)
    .bind(item_id)
    .execute(pool)
    .await?;

    if removed.rows_affected() > 0 {
        return Ok(false);
    }

    // UNIQUE(user_id, item_type, item_id) makes a double-insert race a
    // no-op rather than a duplicate like.
    sqlx::query(
        r#"
        INSERT INTO likes (user_id, item_type, item_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, item_type, item_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(item_type)
    .bind(item_id)
    .execute(pool)
    .await?;

    Ok(true)
}

pub async fn count_likes(
    pool: &PgPool,
    item_type: &str,
    item_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM likes WHERE item_type = $1 AND item_id = $2",
    )
    .bind(item_type)
    .bind(item_id)
    .fetch_one(pool)
    .await
}

pub async fn user_liked(
    pool: &PgPool,
    user_id: Uuid,
    item_type: &str,
    item_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = $1 AND item_type = $2 AND item_id = $3)",
    )
    .bind(user_id)
    .bind(item_type)
    .bind(item_id)
    .fetch_one(pool)
    .await
}
