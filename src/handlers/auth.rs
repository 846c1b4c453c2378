use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::handlers::StatusResponse;
use crate::middleware::AuthUser;
use crate::models::User;
use crate::security::{jwt, password};
use crate::services::content;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,

    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: jwt::TokenResponse,
}

pub async fn register(
    pool: web::Data<PgPool>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;
    content::validate_username(&payload.username)?;

    if user_repo::find_by_username(&pool, &payload.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Username is already taken".into()));
    }

    let password_hash = password::hash_password(&payload.password)?;
    let user =
        user_repo::create_user(&pool, &payload.username, &payload.display_name, &password_hash)
            .await?;

    let token = jwt::generate_access_token(user.id, &user.username, &user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(username = %user.username, "New account registered");
    Ok(HttpResponse::Created().json(AuthResponse { user, token }))
}

pub async fn login(
    pool: web::Data<PgPool>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    // Unknown username and wrong password produce the same error so the
    // endpoint does not confirm which usernames exist.
    let user = user_repo::find_by_username(&pool, &payload.username)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid username or password".into()))?;

    if !password::verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Authentication("Invalid username or password".into()));
    }

    user_repo::touch_last_active(&pool, user.id).await?;

    let token = jwt::generate_access_token(user.id, &user.username, &user.role)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(username = %user.username, "User logged in");
    Ok(HttpResponse::Ok().json(AuthResponse { user, token }))
}

/// Logging out clears `last_active` so the account immediately reads as
/// offline instead of aging through idle.
pub async fn logout(pool: web::Data<PgPool>, auth: AuthUser) -> Result<HttpResponse> {
    user_repo::clear_last_active(&pool, auth.id).await?;
    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

pub async fn me(pool: web::Data<PgPool>, auth: AuthUser) -> Result<HttpResponse> {
    let user = user_repo::find_by_id(&pool, auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User no longer exists".into()))?;
    Ok(HttpResponse::Ok().json(user))
}
