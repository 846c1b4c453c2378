use actix_web::{web, HttpResponse};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{comment_repo, like_repo, post_repo};
use crate::error::{AppError, Result};
use crate::middleware::AuthUser;

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
}

/// Toggle a like on a post or comment. Unknown item types are a client
/// error, not a silent no-op.
pub async fn toggle(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse> {
    let (item_type, item_id) = path.into_inner();

    let exists = match item_type.as_str() {
        "post" => post_repo::find_post(&pool, item_id).await?.is_some(),
        "comment" => comment_repo::find_comment(&pool, item_id).await?.is_some(),
        other => {
            return Err(AppError::BadRequest(format!(
                "Unknown likeable item type '{other}'"
            )))
        }
    };
    if !exists {
        return Err(AppError::NotFound(format!("{item_type} not found")));
    }

    let liked = like_repo::toggle_like(&pool, auth.id, &item_type, item_id).await?;
    let like_count = like_repo::count_likes(&pool, &item_type, item_id).await?;

    Ok(HttpResponse::Ok().json(LikeResponse { liked, like_count }))
}
