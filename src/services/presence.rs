//! Presence classification from a last-active timestamp.
//!
//! Every presence label in the application comes from this classifier;
//! handlers must not carry their own thresholds.

use chrono::{DateTime, Utc};
use serde::Serialize;

const ONLINE_WINDOW_MINUTES: i64 = 5;
const IDLE_WINDOW_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Idle,
    Offline,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Presence::Online => "online",
            Presence::Idle => "idle",
            Presence::Offline => "offline",
        }
    }
}

/// Classify a nullable last-active instant against `now`.
///
/// Absent timestamp is offline. Under 5 elapsed minutes is online, 5 to 60
/// minutes inclusive is idle, beyond that offline. Total over its input
/// domain: nothing here can fail.
pub fn classify(last_active: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Presence {
    let Some(last_active) = last_active else {
        return Presence::Offline;
    };

    // Compare in seconds: minute truncation would misclassify the edges
    // (60m59s must already be offline).
    let elapsed_secs = now.signed_duration_since(last_active).num_seconds();
    if elapsed_secs < ONLINE_WINDOW_MINUTES * 60 {
        Presence::Online
    } else if elapsed_secs <= IDLE_WINDOW_MINUTES * 60 {
        Presence::Idle
    } else {
        Presence::Offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2024-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn missing_timestamp_is_offline() {
        assert_eq!(classify(None, now()), Presence::Offline);
    }

    #[test]
    fn just_active_is_online() {
        let t = now() - Duration::seconds(30);
        assert_eq!(classify(Some(t), now()), Presence::Online);
    }

    #[test]
    fn boundary_4m59s_is_online() {
        let t = now() - (Duration::minutes(4) + Duration::seconds(59));
        assert_eq!(classify(Some(t), now()), Presence::Online);
    }

    #[test]
    fn boundary_5m00s_is_idle() {
        let t = now() - Duration::minutes(5);
        assert_eq!(classify(Some(t), now()), Presence::Idle);
    }

    #[test]
    fn boundary_60m00s_is_idle() {
        let t = now() - Duration::minutes(60);
        assert_eq!(classify(Some(t), now()), Presence::Idle);
    }

    #[test]
    fn boundary_60m01s_is_offline() {
        let t = now() - (Duration::minutes(60) + Duration::seconds(1));
        assert_eq!(classify(Some(t), now()), Presence::Offline);
    }

    #[test]
    fn future_timestamp_counts_as_online() {
        // Clock skew between app instances should not mark a user offline.
        let t = now() + Duration::seconds(30);
        assert_eq!(classify(Some(t), now()), Presence::Online);
    }

    #[test]
    fn labels() {
        assert_eq!(Presence::Online.as_str(), "online");
        assert_eq!(Presence::Idle.as_str(), "idle");
        assert_eq!(Presence::Offline.as_str(), "offline");
    }
}
