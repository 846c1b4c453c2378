use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub music_link: Option<String>,
    pub status_note: Option<String>,
    pub role: String,
    pub last_active: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub post_type: String,
    pub visibility: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// One friend-request edge. At most one edge may exist per unordered pair;
/// the resolver treats (a,b) and (b,a) as the same relationship and only
/// uses the direction to tell who sent the request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendEdge {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub recipient_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Directional block edge. A blocking B says nothing about B blocking A.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlockEdge {
    pub id: Uuid,
    pub blocker_id: Uuid,
    pub blocked_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Per-directed-pair conversation settings, one row owned by each side.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConversationSettings {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub counterpart_id: Uuid,
    pub nickname: Option<String>,
    pub read_receipts: bool,
    pub ephemeral_mode: bool,
}
