use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{social_repo, user_repo};
use crate::error::{AppError, Result};
use crate::handlers::{StatusResponse, UserCard};
use crate::middleware::AuthUser;
use crate::services::relationship::{self, Relationship};

async fn resolve_pair(pool: &PgPool, viewer: Uuid, target: Uuid) -> Result<Relationship> {
    let friend_edges = social_repo::friend_edges_between(pool, viewer, target).await?;
    let block_edges = social_repo::blocks_between(pool, viewer, target).await?;
    Ok(relationship::resolve(viewer, target, &friend_edges, &block_edges)?)
}

async fn require_user(pool: &PgPool, user_id: Uuid) -> Result<()> {
    if user_repo::exists(pool, user_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("User not found".into()))
    }
}

/// Send a friend request. An edge already on record in either direction,
/// pending or accepted, makes this a no-op rather than a second edge.
pub async fn friend_request(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    require_user(&pool, target).await?;

    match resolve_pair(&pool, auth.id, target).await? {
        Relationship::SelfProfile => {
            return Err(AppError::BadRequest("Cannot befriend yourself".into()))
        }
        Relationship::BlockedByTarget | Relationship::BlockedTarget => {
            return Err(AppError::Authorization(
                "Friend requests are not possible between these accounts".into(),
            ))
        }
        Relationship::None => {
            social_repo::create_request(&pool, auth.id, target).await?;
        }
        // An edge already exists in some direction; sending again changes
        // nothing.
        Relationship::RequestSent | Relationship::RequestReceived | Relationship::Friends => {}
    }

    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

/// Accept the pending request sent by `{id}` to the caller.
pub async fn friend_accept(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let requester = path.into_inner();
    if !social_repo::accept_request(&pool, requester, auth.id).await? {
        return Err(AppError::NotFound(
            "No pending friend request from this user".into(),
        ));
    }
    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

/// Remove the friend edge between the caller and `{id}`, whichever
/// direction it points. Covers unfriending, cancelling and declining;
/// idempotent when no edge exists.
pub async fn friend_remove(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    social_repo::delete_friendship(&pool, auth.id, target).await?;
    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

/// Block `{id}`: severs any friendship and records the block atomically.
/// Idempotent when the block already exists.
pub async fn block(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    if target == auth.id {
        return Err(AppError::BadRequest("Cannot block yourself".into()));
    }
    require_user(&pool, target).await?;

    social_repo::create_block(&pool, auth.id, target).await?;
    tracing::info!(blocker = %auth.id, blocked = %target, "Block recorded");
    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

/// Remove the caller's own block of `{id}`. The reverse block, if any,
/// stays untouched.
pub async fn unblock(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    social_repo::delete_block(&pool, auth.id, target).await?;
    Ok(HttpResponse::Ok().json(StatusResponse::ok()))
}

#[derive(Debug, Serialize)]
pub struct PendingRequestView {
    pub id: Uuid,
    pub requester: UserCard,
    pub created_at: DateTime<Utc>,
}

/// Pending friend requests addressed to the caller, newest first.
pub async fn pending_requests(pool: web::Data<PgPool>, auth: AuthUser) -> Result<HttpResponse> {
    let now = Utc::now();
    let edges = social_repo::pending_requests_for(&pool, auth.id).await?;

    let mut views = Vec::with_capacity(edges.len());
    for edge in edges {
        // A requester row can vanish between the edge fetch and here;
        // skipping it beats failing the whole list.
        if let Some(requester) = user_repo::find_by_id(&pool, edge.requester_id).await? {
            views.push(PendingRequestView {
                id: edge.id,
                requester: UserCard::from_user(&requester, now),
                created_at: edge.created_at,
            });
        }
    }

    Ok(HttpResponse::Ok().json(views))
}
