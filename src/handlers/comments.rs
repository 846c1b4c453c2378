use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::{comment_repo, post_repo, social_repo};
use crate::error::{AppError, Result};
use crate::handlers::StatusResponse;
use crate::middleware::AuthUser;
use crate::services::content;
use crate::services::relationship;
use crate::services::visibility::{self, Visibility};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub content: String,
}

/// Comment on a post. A post the caller cannot see cannot be commented on
/// either; it 404s rather than confirming the post exists.
pub async fn create_comment(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
    payload: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let post_id = path.into_inner();
    let post = post_repo::find_post(&pool, post_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let vis = Visibility::parse(&post.visibility);
    let rel = if auth.id != post.author_id && vis != Visibility::Public {
        let friend_edges = social_repo::friend_edges_between(&pool, auth.id, post.author_id).await?;
        let block_edges = social_repo::blocks_between(&pool, auth.id, post.author_id).await?;
        Some(relationship::resolve(
            auth.id,
            post.author_id,
            &friend_edges,
            &block_edges,
        )?)
    } else {
        None
    };

    if !visibility::can_view(post.author_id, vis, Some(auth.id), rel) {
        return Err(AppError::NotFound("Post not found".into()));
    }

    let body = content::parse_mentions(payload.content.trim());
    let comment = comment_repo::create_comment(&pool, post_id, auth.id, &body).await?;

    Ok(HttpResponse::Created().json(comment))
}

pub async fn delete_comment(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if !auth.is_admin() {
        return Err(AppError::Authorization("Admin role required".into()));
    }

    let comment_id = path.into_inner();
    if !comment_repo::delete_comment_cascading(&pool, comment_id).await? {
        return Err(AppError::NotFound("Comment not found".into()));
    }

    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}
