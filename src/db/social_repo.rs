use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{BlockEdge, FriendEdge};
use crate::services::relationship::{FRIEND_STATUS_ACCEPTED, FRIEND_STATUS_PENDING};

/// All friend edges touching the unordered pair (a, b), either direction.
/// The resolver treats more than one as a data-integrity error.
pub async fn friend_edges_between(
    pool: &PgPool,
    a: Uuid,
    b: Uuid,
) -> Result<Vec<FriendEdge>, sqlx::Error> {
    sqlx::query_as::<_, FriendEdge>(
        r#"
        SELECT id, requester_id, recipient_id, status, created_at
        FROM friends
        WHERE (requester_id = $1 AND recipient_id = $2)
           OR (requester_id = $2 AND recipient_id = $1)
        "#,
    )
    .bind(a)
    .bind(b)
    .fetch_all(pool)
    .await
}

/// Block edges between the pair, both directions.
pub async fn blocks_between(pool: &PgPool, a: Uuid, b: Uuid) -> Result<Vec<BlockEdge>, sqlx::Error> {
    sqlx::query_as::<_, BlockEdge>(
        r#"
        SELECT id, blocker_id, blocked_id, created_at
        FROM blocks
        WHERE (blocker_id = $1 AND blocked_id = $2)
           OR (blocker_id = $2 AND blocked_id = $1)
        "#,
    )
    .bind(a)
    .bind(b)
    .fetch_all(pool)
    .await
}

/// Ids of everyone with an accepted friendship with `user_id`.
pub async fn accepted_friend_ids(pool: &PgPool, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT CASE WHEN requester_id = $1 THEN recipient_id ELSE requester_id END
        FROM friends
        WHERE (requester_id = $1 OR recipient_id = $1) AND status = $2
        "#,
    )
    .bind(user_id)
    .bind(FRIEND_STATUS_ACCEPTED)
    .fetch_all(pool)
    .await
}

pub async fn create_request(
    pool: &PgPool,
    requester_id: Uuid,
    recipient_id: Uuid,
) -> Result<FriendEdge, sqlx::Error> {
    sqlx::query_as::<_, FriendEdge>(
        r#"
        INSERT INTO friends (requester_id, recipient_id, status)
        VALUES ($1, $2, $3)
        RETURNING id, requester_id, recipient_id, status, created_at
        "#,
    )
    .bind(requester_id)
    .bind(recipient_id)
    .bind(FRIEND_STATUS_PENDING)
    .fetch_one(pool)
    .await
}

/// Accept the pending request FROM `requester_id` TO `recipient_id`.
/// Returns false when no such pending edge exists.
pub async fn accept_request(
    pool: &PgPool,
    requester_id: Uuid,
    recipient_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE friends
        SET status = $3
        WHERE requester_id = $1 AND recipient_id = $2 AND status = $4
        "#,
    )
    .bind(requester_id)
    .bind(recipient_id)
    .bind(FRIEND_STATUS_ACCEPTED)
    .bind(FRIEND_STATUS_PENDING)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove any friend edge between the pair, accepted or pending, either
/// direction. Covers unfriending, cancelling a sent request and declining
/// a received one.
pub async fn delete_friendship(pool: &PgPool, a: Uuid, b: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM friends
        WHERE (requester_id = $1 AND recipient_id = $2)
           OR (requester_id = $2 AND recipient_id = $1)
        "#,
    )
    .bind(a)
    .bind(b)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Block `blocked_id`: the friendship (if any) is severed and the block
/// edge recorded in the same transaction, so no interleaving read can see
/// a blocked pair that is still friends.
pub async fn create_block(
    pool: &PgPool,
    blocker_id: Uuid,
    blocked_id: Uuid,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        DELETE FROM friends
        WHERE (requester_id = $1 AND recipient_id = $2)
           OR (requester_id = $2 AND recipient_id = $1)
        "#,
    )
    .bind(blocker_id)
    .bind(blocked_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO blocks (blocker_id, blocked_id)
        VALUES ($1, $2)
        ON CONFLICT (blocker_id, blocked_id) DO NOTHING
        "#,
    )
    .bind(blocker_id)
    .bind(blocked_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn delete_block(
    pool: &PgPool,
    blocker_id: Uuid,
    blocked_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM blocks WHERE blocker_id = $1 AND blocked_id = $2")
        .bind(blocker_id)
        .bind(blocked_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Pending requests addressed TO `user_id`, newest first.
pub async fn pending_requests_for(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<FriendEdge>, sqlx::Error> {
    sqlx::query_as::<_, FriendEdge>(
        r#"
        SELECT id, requester_id, recipient_id, status, created_at
        FROM friends
        WHERE recipient_id = $1 AND status = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(FRIEND_STATUS_PENDING)
    .fetch_all(pool)
    .await
}
