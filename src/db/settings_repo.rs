use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ConversationSettings;

const SETTINGS_COLUMNS: &str =
    "id, owner_id, counterpart_id, nickname, read_receipts, ephemeral_mode";

/// Fetch without creating. Listing views use this so browsing an inbox does
/// not mint settings rows for threads never opened.
pub async fn find_settings(
    pool: &PgPool,
    owner_id: Uuid,
    counterpart_id: Uuid,
) -> Result<Option<ConversationSettings>, sqlx::Error> {
    sqlx::query_as::<_, ConversationSettings>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM conversation_settings \
         WHERE owner_id = $1 AND counterpart_id = $2"
    ))
    .bind(owner_id)
    .bind(counterpart_id)
    .fetch_optional(pool)
    .await
}

/// Fetch the settings row owned by `owner_id` for its conversation with
/// `counterpart_id`, creating a default row on first access. Rows are made
/// lazily, one per direction, the first time a thread is opened.
pub async fn get_or_create(
    pool: &PgPool,
    owner_id: Uuid,
    counterpart_id: Uuid,
) -> Result<ConversationSettings, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO conversation_settings (owner_id, counterpart_id)
        VALUES ($1, $2)
        ON CONFLICT (owner_id, counterpart_id) DO NOTHING
        "#,
    )
    .bind(owner_id)
    .bind(counterpart_id)
    .execute(pool)
    .await?;

    sqlx::query_as::<_, ConversationSettings>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM conversation_settings \
         WHERE owner_id = $1 AND counterpart_id = $2"
    ))
    .bind(owner_id)
    .bind(counterpart_id)
    .fetch_one(pool)
    .await
}

/// Both sides' rows for the pair, created on demand. The caller needs the
/// counterpart's row as well because ephemeral mode applies when either
/// side enables it.
pub async fn get_or_create_pair(
    pool: &PgPool,
    owner_id: Uuid,
    counterpart_id: Uuid,
) -> Result<(ConversationSettings, ConversationSettings), sqlx::Error> {
    let mine = get_or_create(pool, owner_id, counterpart_id).await?;
    let theirs = get_or_create(pool, counterpart_id, owner_id).await?;
    Ok((mine, theirs))
}

/// Update the owner's side of the conversation. Only the owner's row
/// changes; the counterpart's settings are never written here.
pub async fn update_settings(
    pool: &PgPool,
    owner_id: Uuid,
    counterpart_id: Uuid,
    nickname: Option<&str>,
    read_receipts: bool,
    ephemeral_mode: bool,
) -> Result<ConversationSettings, sqlx::Error> {
    sqlx::query_as::<_, ConversationSettings>(&format!(
        r#"
        UPDATE conversation_settings
        SET nickname = $3, read_receipts = $4, ephemeral_mode = $5
        WHERE owner_id = $1 AND counterpart_id = $2
        RETURNING {SETTINGS_COLUMNS}
        "#
    ))
    .bind(owner_id)
    .bind(counterpart_id)
    .bind(nickname)
    .bind(read_receipts)
    .bind(ephemeral_mode)
    .fetch_one(pool)
    .await
}
