use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

const USER_COLUMNS: &str = "id, username, display_name, password_hash, profile_picture, bio, \
                            music_link, status_note, role, last_active, created_at";

pub async fn create_user(
    pool: &PgPool,
    username: &str,
    display_name: &str,
    password_hash: &str,
) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, display_name, password_hash, last_active)
        VALUES ($1, $2, $3, NOW())
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(username)
    .bind(display_name)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// The site owner's profile, shown to anonymous visitors as the fallback
/// profile card.
pub async fn find_admin(pool: &PgPool) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = 'admin' ORDER BY created_at ASC LIMIT 1"
    ))
    .fetch_optional(pool)
    .await
}

pub async fn username_taken_by_other(
    pool: &PgPool,
    username: &str,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND id != $2)",
    )
    .bind(username)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    username: &str,
    display_name: &str,
    bio: Option<&str>,
    profile_picture: Option<&str>,
    music_link: Option<&str>,
    status_note: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        UPDATE users
        SET username = $2, display_name = $3, bio = $4, profile_picture = $5,
            music_link = $6, status_note = $7
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .bind(username)
    .bind(display_name)
    .bind(bio)
    .bind(profile_picture)
    .bind(music_link)
    .bind(status_note)
    .fetch_one(pool)
    .await
}

pub async fn touch_last_active(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_active = NOW() WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Logging out clears the presence timestamp so the user reads as offline.
pub async fn clear_last_active(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_active = NULL WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn exists(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await
}
