use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::User;
use crate::services::presence;

pub mod auth;
pub mod comments;
pub mod health;
pub mod likes;
pub mod messages;
pub mod posts;
pub mod relationships;
pub mod users;

/// Compact user card embedded in feeds, comments and conversation lists.
/// Presence is resolved at render time from `last_active`.
#[derive(Debug, Clone, Serialize)]
pub struct UserCard {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub profile_picture: Option<String>,
    pub presence: &'static str,
}

impl UserCard {
    pub fn from_user(user: &User, now: DateTime<Utc>) -> Self {
        Self::from_parts(
            user.id,
            &user.username,
            &user.display_name,
            user.profile_picture.clone(),
            user.last_active,
            now,
        )
    }

    pub fn from_parts(
        id: Uuid,
        username: &str,
        display_name: &str,
        profile_picture: Option<String>,
        last_active: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        UserCard {
            id,
            username: username.to_string(),
            display_name: display_name.to_string(),
            profile_picture,
            presence: presence::classify(last_active, now).as_str(),
        }
    }
}

/// Plain acknowledgement body for mutations that have nothing else to say.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        StatusResponse { status: "ok" }
    }
}
