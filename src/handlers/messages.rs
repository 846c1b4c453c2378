use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::{message_repo, settings_repo, social_repo, user_repo};
use crate::error::{AppError, Result};
use crate::handlers::UserCard;
use crate::middleware::AuthUser;
use crate::models::{ConversationSettings, Message, User};
use crate::services::conversation;
use crate::services::relationship::{self, Relationship};

async fn counterpart_by_username(pool: &PgPool, username: &str) -> Result<User> {
    user_repo::find_by_username(pool, username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn resolve_pair(pool: &PgPool, viewer: Uuid, target: Uuid) -> Result<Relationship> {
    let friend_edges = social_repo::friend_edges_between(pool, viewer, target).await?;
    let block_edges = social_repo::blocks_between(pool, viewer, target).await?;
    Ok(relationship::resolve(viewer, target, &friend_edges, &block_edges)?)
}

/// A block in either direction seals the conversation: no history, no
/// presence, no settings rows, no read-flag transitions.
fn ensure_conversation_access(rel: Relationship) -> Result<()> {
    match rel {
        Relationship::BlockedByTarget | Relationship::BlockedTarget => Err(
            AppError::Authorization("This conversation is not available".into()),
        ),
        _ => Ok(()),
    }
}

/// The toggles a client needs from a settings row. Nickname is only
/// surfaced for the caller's own side; the counterpart's nickname for the
/// caller is their business.
#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub nickname: Option<String>,
    pub read_receipts: bool,
    pub ephemeral_mode: bool,
}

impl SettingsView {
    fn own(settings: &ConversationSettings) -> Self {
        SettingsView {
            nickname: settings.nickname.clone(),
            read_receipts: settings.read_receipts,
            ephemeral_mode: settings.ephemeral_mode,
        }
    }

    fn counterpart(settings: &ConversationSettings) -> Self {
        SettingsView {
            nickname: None,
            read_receipts: settings.read_receipts,
            ephemeral_mode: settings.ephemeral_mode,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub counterpart: UserCard,
    /// Stored display name, replaced by the caller's nickname when set.
    pub display_name: String,
    pub last_message: Option<Message>,
    pub unread_count: i64,
}

/// The caller's inbox: every accepted friend, with presence, last message
/// and per-thread unread count, most recently active thread first.
pub async fn list_conversations(pool: web::Data<PgPool>, auth: AuthUser) -> Result<HttpResponse> {
    let now = Utc::now();
    let friend_ids = social_repo::accepted_friend_ids(&pool, auth.id).await?;

    let mut summaries = Vec::with_capacity(friend_ids.len());
    for friend_id in friend_ids {
        let Some(friend) = user_repo::find_by_id(&pool, friend_id).await? else {
            continue;
        };

        let last_message = message_repo::last_message_between(&pool, auth.id, friend_id).await?;
        let unread_count = message_repo::unread_count_from(&pool, auth.id, friend_id).await?;

        // Browsing the inbox must not mint settings rows, so this reads
        // without creating.
        let settings = settings_repo::find_settings(&pool, auth.id, friend_id).await?;
        let display_name = match settings.as_ref() {
            Some(s) => conversation::display_name(s, &friend.display_name).to_string(),
            None => friend.display_name.clone(),
        };

        summaries.push(ConversationSummary {
            counterpart: UserCard::from_user(&friend, now),
            display_name,
            last_message,
            unread_count,
        });
    }

    // Threads with traffic first, newest traffic on top; untouched friends
    // trail in name order.
    summaries.sort_by(|a, b| {
        let a_at = a.last_message.as_ref().map(|m| m.created_at);
        let b_at = b.last_message.as_ref().map(|m| m.created_at);
        b_at.cmp(&a_at)
            .then_with(|| a.counterpart.username.cmp(&b.counterpart.username))
    });

    Ok(HttpResponse::Ok().json(summaries))
}

#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    pub counterpart: UserCard,
    pub display_name: String,
    pub messages: Vec<Message>,
    pub settings: SettingsView,
    pub counterpart_settings: SettingsView,
}

/// Open a thread: both settings rows come into existence here if they were
/// missing, unread messages flip to read together with the history fetch,
/// and the ephemeral window applies when either side enabled it.
pub async fn get_thread(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let counterpart = counterpart_by_username(&pool, &path.into_inner()).await?;
    if counterpart.id == auth.id {
        return Err(AppError::BadRequest(
            "Cannot open a conversation with yourself".into(),
        ));
    }
    ensure_conversation_access(resolve_pair(&pool, auth.id, counterpart.id).await?)?;

    let now = Utc::now();
    let (mine, theirs) = settings_repo::get_or_create_pair(&pool, auth.id, counterpart.id).await?;

    let history = message_repo::fetch_thread_marking_read(&pool, auth.id, counterpart.id).await?;
    let ephemeral = conversation::ephemeral_enabled(&mine, &theirs);
    let messages = conversation::filter_ephemeral(history, ephemeral, now);

    let display_name = conversation::display_name(&mine, &counterpart.display_name).to_string();

    Ok(HttpResponse::Ok().json(ThreadResponse {
        counterpart: UserCard::from_user(&counterpart, now),
        display_name,
        messages,
        settings: SettingsView::own(&mine),
        counterpart_settings: SettingsView::counterpart(&theirs),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 5000, message = "Message must be 1-5000 characters"))]
    pub content: String,
}

/// Send a direct message. Only accepted friends can message each other; a
/// block in either direction refuses delivery outright.
pub async fn send_message(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<String>,
    payload: web::Json<SendMessageRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let counterpart = counterpart_by_username(&pool, &path.into_inner()).await?;
    if counterpart.id == auth.id {
        return Err(AppError::BadRequest("Cannot message yourself".into()));
    }

    match resolve_pair(&pool, auth.id, counterpart.id).await? {
        Relationship::Friends => {}
        Relationship::BlockedByTarget | Relationship::BlockedTarget => {
            return Err(AppError::Authorization(
                "Messages cannot be exchanged between these accounts".into(),
            ))
        }
        _ => {
            return Err(AppError::Authorization(
                "Only friends can exchange messages".into(),
            ))
        }
    }

    let message =
        message_repo::insert_message(&pool, auth.id, counterpart.id, payload.content.trim())
            .await?;

    Ok(HttpResponse::Created().json(message))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    #[validate(length(max = 64, message = "Nickname is limited to 64 characters"))]
    pub nickname: Option<String>,
    pub read_receipts: Option<bool>,
    pub ephemeral_mode: Option<bool>,
}

/// Update the caller's side of a conversation. Omitted fields keep their
/// current values; an empty nickname clears the override.
pub async fn update_settings(
    pool: web::Data<PgPool>,
    auth: AuthUser,
    path: web::Path<String>,
    payload: web::Json<UpdateSettingsRequest>,
) -> Result<HttpResponse> {
    payload.validate()?;

    let counterpart = counterpart_by_username(&pool, &path.into_inner()).await?;
    if counterpart.id == auth.id {
        return Err(AppError::BadRequest(
            "Cannot configure a conversation with yourself".into(),
        ));
    }
    ensure_conversation_access(resolve_pair(&pool, auth.id, counterpart.id).await?)?;

    let current = settings_repo::get_or_create(&pool, auth.id, counterpart.id).await?;

    let nickname = match &payload.nickname {
        Some(n) if n.trim().is_empty() => None,
        Some(n) => Some(n.trim()),
        None => current.nickname.as_deref(),
    };
    let read_receipts = payload.read_receipts.unwrap_or(current.read_receipts);
    let ephemeral_mode = payload.ephemeral_mode.unwrap_or(current.ephemeral_mode);

    let updated = settings_repo::update_settings(
        &pool,
        auth.id,
        counterpart.id,
        nickname,
        read_receipts,
        ephemeral_mode,
    )
    .await?;

    Ok(HttpResponse::Ok().json(SettingsView::own(&updated)))
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

/// Global unread badge for the navigation bar.
pub async fn unread_count(pool: web::Data<PgPool>, auth: AuthUser) -> Result<HttpResponse> {
    let unread = message_repo::unread_count_total(&pool, auth.id).await?;
    Ok(HttpResponse::Ok().json(UnreadCountResponse { unread }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_states_seal_the_conversation() {
        assert!(ensure_conversation_access(Relationship::BlockedByTarget).is_err());
        assert!(ensure_conversation_access(Relationship::BlockedTarget).is_err());
    }

    #[test]
    fn unblocked_states_pass_through() {
        for rel in [
            Relationship::None,
            Relationship::RequestSent,
            Relationship::RequestReceived,
            Relationship::Friends,
        ] {
            assert!(ensure_conversation_access(rel).is_ok());
        }
    }

    #[test]
    fn block_refusal_maps_to_forbidden() {
        use actix_web::error::ResponseError;
        use actix_web::http::StatusCode;

        let err = ensure_conversation_access(Relationship::BlockedByTarget).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}
