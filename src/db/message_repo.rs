use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Message;

pub async fn insert_message(
    pool: &PgPool,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: &str,
) -> Result<Message, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (sender_id, receiver_id, content)
        VALUES ($1, $2, $3)
        RETURNING id, sender_id, receiver_id, content, is_read, created_at
        "#,
    )
    .bind(sender_id)
    .bind(receiver_id)
    .bind(content)
    .fetch_one(pool)
    .await
}

/// Open a thread: mark every message addressed to `viewer_id` as read, then
/// fetch the full history, inside one transaction. Opening the thread and
/// clearing its unread state are a single atomic step.
pub async fn fetch_thread_marking_read(
    pool: &PgPool,
    viewer_id: Uuid,
    counterpart_id: Uuid,
) -> Result<Vec<Message>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE messages
        SET is_read = TRUE
        WHERE sender_id = $2 AND receiver_id = $1 AND is_read = FALSE
        "#,
    )
    .bind(viewer_id)
    .bind(counterpart_id)
    .execute(&mut *tx)
    .await?;

    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, receiver_id, content, is_read, created_at
        FROM messages
        WHERE (sender_id = $1 AND receiver_id = $2)
           OR (sender_id = $2 AND receiver_id = $1)
        ORDER BY created_at ASC
        "#,
    )
    .bind(viewer_id)
    .bind(counterpart_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(messages)
}

pub async fn last_message_between(
    pool: &PgPool,
    a: Uuid,
    b: Uuid,
) -> Result<Option<Message>, sqlx::Error> {
    sqlx::query_as::<_, Message>(
        r#"
        SELECT id, sender_id, receiver_id, content, is_read, created_at
        FROM messages
        WHERE (sender_id = $1 AND receiver_id = $2)
           OR (sender_id = $2 AND receiver_id = $1)
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(a)
    .bind(b)
    .fetch_one(pool)
    .await
    .map(Some)
    .or_else(|err| match err {
        sqlx::Error::RowNotFound => Ok(None),
        other => Err(other),
    })
}

/// Unread messages sent by `counterpart_id` to `viewer_id`.
pub async fn unread_count_from(
    pool: &PgPool,
    viewer_id: Uuid,
    counterpart_id: Uuid,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM messages
        WHERE sender_id = $2 AND receiver_id = $1 AND is_read = FALSE
        "#,
    )
    .bind(viewer_id)
    .bind(counterpart_id)
    .fetch_one(pool)
    .await
}

/// Total unread messages addressed to `viewer_id`, for the inbox badge.
pub async fn unread_count_total(pool: &PgPool, viewer_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND is_read = FALSE",
    )
    .bind(viewer_id)
    .fetch_one(pool)
    .await
}
