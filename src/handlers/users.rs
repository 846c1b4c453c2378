use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::db::{post_repo, social_repo, user_repo};
use crate::error::{AppError, Result};
use crate::handlers::posts::PostView;
use crate::middleware::{AuthUser, MaybeUser};
use crate::models::User;
use crate::services::content;
use crate::services::presence;
use crate::services::relationship::{self, Relationship};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: uuid::Uuid,
    pub username: String,
    pub display_name: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub music_link: Option<String>,
    pub status_note: Option<String>,
    pub role: String,
    pub presence: &'static str,
    /// Resolver output as seen from the viewer; None for anonymous visitors.
    pub relationship: Option<&'static str>,
    pub posts: Vec<PostView>,
}

/// Public profile page: identity, presence, resolved relationship and the
/// visibility-filtered post list. A target-side block hides the profile
/// entirely before any relationship detail is computed into the response.
pub async fn get_profile(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
    viewer: MaybeUser,
) -> Result<HttpResponse> {
    let username = path.into_inner();
    let target = user_repo::find_by_username(&pool, &username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let now = Utc::now();

    let rel = match viewer.id() {
        Some(viewer_id) => {
            let friend_edges = social_repo::friend_edges_between(&pool, viewer_id, target.id).await?;
            let block_edges = social_repo::blocks_between(&pool, viewer_id, target.id).await?;
            let rel = relationship::resolve(viewer_id, target.id, &friend_edges, &block_edges)?;
            if rel == Relationship::BlockedByTarget {
                return Err(AppError::Authorization("This profile is not available".into()));
            }
            Some(rel)
        }
        None => None,
    };

    let posts = post_repo::list_by_author(&pool, target.id).await?;
    let visible = crate::handlers::posts::render_visible_posts(&pool, posts, &viewer, now).await?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        id: target.id,
        username: target.username,
        display_name: target.display_name,
        profile_picture: target.profile_picture,
        bio: target.bio,
        music_link: target.music_link,
        status_note: target.status_note,
        role: target.role,
        presence: presence::classify(target.last_active, now).as_str(),
        relationship: rel.map(|r| r.as_str()),
        posts: visible,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    pub username: String,

    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: String,

    #[validate(length(max = 2000, message = "Bio is limited to 2000 characters"))]
    pub bio: Option<String>,

    pub profile_picture: Option<String>,
    pub music_link: Option<String>,

    #[validate(length(max = 140, message = "Status note is limited to 140 characters"))]
    pub status_note: Option<String>,
}

/// Edit the caller's own profile. Username changes are allowed but must not
/// collide with another account.
pub async fn update_me(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    payload: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;
    content::validate_username(&payload.username)?;

    if user_repo::username_taken_by_other(&pool, &payload.username, auth.id).await? {
        return Err(AppError::Conflict("Username is already taken".into()));
    }

    let user: User = user_repo::update_profile(
        &pool,
        auth.id,
        &payload.username,
        &payload.display_name,
        payload.bio.as_deref(),
        payload.profile_picture.as_deref(),
        payload.music_link.as_deref(),
        payload.status_note.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(user))
}
