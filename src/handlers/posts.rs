use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::post_repo::PostWithAuthor;
use crate::db::{comment_repo, like_repo, post_repo, social_repo, user_repo};
use crate::error::{AppError, Result};
use crate::handlers::{StatusResponse, UserCard};
use crate::middleware::{AuthUser, MaybeUser};
use crate::services::content;
use crate::services::relationship::{self, Relationship};
use crate::services::visibility::{self, Visibility};

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub author: UserCard,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
    pub viewer_liked: bool,
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub author: UserCard,
    pub content: String,
    pub post_type: String,
    pub visibility: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
    pub viewer_liked: bool,
    pub comments: Vec<CommentView>,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    /// The viewer's own card, or the site owner's card for anonymous
    /// visitors so the sidebar always has a profile to show.
    pub profile_card: Option<UserCard>,
    pub posts: Vec<PostView>,
}

/// Resolve the viewer's relationship towards `author`, memoized per author
/// so a feed does not refetch the same edge pair for every post.
async fn relationship_cached(
    pool: &PgPool,
    viewer: Uuid,
    author: Uuid,
    cache: &mut HashMap<Uuid, Relationship>,
) -> Result<Relationship> {
    if let Some(rel) = cache.get(&author) {
        return Ok(*rel);
    }
    let friend_edges = social_repo::friend_edges_between(pool, viewer, author).await?;
    let block_edges = social_repo::blocks_between(pool, viewer, author).await?;
    let rel = relationship::resolve(viewer, author, &friend_edges, &block_edges)?;
    cache.insert(author, rel);
    Ok(rel)
}

/// Apply the per-post visibility filter over a candidate set and hydrate
/// the survivors with likes, comments and author presence. The storage
/// layer hands over everything; this is the only place posts are filtered.
pub async fn render_visible_posts(
    pool: &PgPool,
    candidates: Vec<PostWithAuthor>,
    viewer: &MaybeUser,
    now: DateTime<Utc>,
) -> Result<Vec<PostView>> {
    let viewer_id = viewer.id();
    let mut rel_cache: HashMap<Uuid, Relationship> = HashMap::new();
    let mut views = Vec::with_capacity(candidates.len());

    for post in candidates {
        let vis = Visibility::parse(&post.visibility);

        let rel = match viewer_id {
            Some(v) if v != post.author_id && vis != Visibility::Public => {
                Some(relationship_cached(pool, v, post.author_id, &mut rel_cache).await?)
            }
            _ => None,
        };

        if !visibility::can_view(post.author_id, vis, viewer_id, rel) {
            continue;
        }

        views.push(hydrate_post(pool, post, viewer_id, now).await?);
    }

    Ok(views)
}

async fn hydrate_post(
    pool: &PgPool,
    post: PostWithAuthor,
    viewer_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<PostView> {
    let like_count = like_repo::count_likes(pool, "post", post.id).await?;
    let viewer_liked = match viewer_id {
        Some(v) => like_repo::user_liked(pool, v, "post", post.id).await?,
        None => false,
    };

    let mut comments = Vec::new();
    for comment in comment_repo::list_for_post(pool, post.id).await? {
        let like_count = like_repo::count_likes(pool, "comment", comment.id).await?;
        let viewer_liked = match viewer_id {
            Some(v) => like_repo::user_liked(pool, v, "comment", comment.id).await?,
            None => false,
        };
        comments.push(CommentView {
            id: comment.id,
            author: UserCard::from_parts(
                comment.author_id,
                &comment.username,
                &comment.display_name,
                comment.profile_picture,
                comment.author_last_active,
                now,
            ),
            content: comment.content,
            created_at: comment.created_at,
            like_count,
            viewer_liked,
        });
    }

    Ok(PostView {
        id: post.id,
        author: UserCard::from_parts(
            post.author_id,
            &post.username,
            &post.display_name,
            post.profile_picture,
            post.author_last_active,
            now,
        ),
        content: post.content,
        post_type: post.post_type,
        visibility: post.visibility,
        image_url: post.image_url,
        created_at: post.created_at,
        like_count,
        viewer_liked,
        comments,
    })
}

/// The home feed: every post the viewer is allowed to see, newest first.
pub async fn feed(pool: web::Data<PgPool>, viewer: MaybeUser) -> Result<HttpResponse> {
    let now = Utc::now();
    let candidates = post_repo::list_all(&pool).await?;
    let posts = render_visible_posts(&pool, candidates, &viewer, now).await?;

    let profile_card = match viewer.id() {
        Some(viewer_id) => user_repo::find_by_id(&pool, viewer_id)
            .await?
            .map(|u| UserCard::from_user(&u, now)),
        None => user_repo::find_admin(&pool)
            .await?
            .map(|u| UserCard::from_user(&u, now)),
    };

    Ok(HttpResponse::Ok().json(FeedResponse {
        profile_card,
        posts,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(max = 10000, message = "Post body is limited to 10000 characters"))]
    pub content: Option<String>,

    pub image_url: Option<String>,

    #[serde(default = "default_post_type")]
    pub post_type: String,

    #[serde(default = "default_visibility")]
    pub visibility: String,
}

fn default_post_type() -> String {
    "text".to_string()
}

fn default_visibility() -> String {
    "public".to_string()
}

pub async fn create_post(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    payload: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let content_raw = payload.content.as_deref().unwrap_or("").trim();
    if content_raw.is_empty() && payload.image_url.is_none() {
        return Err(AppError::Validation(
            "A post needs text content or an image".into(),
        ));
    }

    // Tags are fixed at write time; unknown tags would render author-only
    // forever, so they are rejected here instead.
    if !matches!(payload.visibility.as_str(), "public" | "friends") {
        return Err(AppError::Validation(
            "Visibility must be 'public' or 'friends'".into(),
        ));
    }

    let body = content::parse_mentions(content_raw);
    let post = post_repo::create_post(
        &pool,
        auth.id,
        &body,
        &payload.post_type,
        &payload.visibility,
        payload.image_url.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Created().json(post))
}

/// Admin-only removal; takes the post's comments and every attached like
/// with it.
pub async fn delete_post(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    if !auth.is_admin() {
        return Err(AppError::Authorization("Admin role required".into()));
    }

    let post_id = path.into_inner();
    if !post_repo::delete_post_cascading(&pool, post_id).await? {
        return Err(AppError::NotFound("Post not found".into()));
    }

    tracing::info!(%post_id, admin = %auth.username, "Post deleted");
    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}
