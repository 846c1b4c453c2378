//! Conversation policy: nickname overrides and ephemeral filtering over a
//! fetched message history. Unread counting is done in SQL by the message
//! repository.
//!
//! Ephemeral mode is a view-time filter, not a retention policy: message
//! rows are never deleted here, and history resurfaces if both sides turn
//! the toggle back off.

use chrono::{DateTime, Utc};

use crate::models::{ConversationSettings, Message};

/// Messages older than this no longer render in an ephemeral conversation.
pub const EPHEMERAL_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// The display name an owner sees for a counterpart: a non-empty nickname
/// from the owner's settings row wins, otherwise the stored display name.
/// The underlying handle is never altered.
pub fn display_name<'a>(settings: &'a ConversationSettings, stored: &'a str) -> &'a str {
    match settings.nickname.as_deref() {
        Some(nickname) if !nickname.is_empty() => nickname,
        _ => stored,
    }
}

/// Ephemeral filtering applies when either side of the pair enabled it.
pub fn ephemeral_enabled(mine: &ConversationSettings, theirs: &ConversationSettings) -> bool {
    mine.ephemeral_mode || theirs.ephemeral_mode
}

/// Filter a merged, ordered history down to the ephemeral window.
///
/// With `ephemeral` off the history passes through untouched. With it on,
/// only messages created within the last 24 hours of `now` survive;
/// messages age out of view continuously rather than being destroyed.
pub fn filter_ephemeral(
    messages: Vec<Message>,
    ephemeral: bool,
    now: DateTime<Utc>,
) -> Vec<Message> {
    if !ephemeral {
        return messages;
    }
    messages
        .into_iter()
        .filter(|m| {
            now.signed_duration_since(m.created_at).num_milliseconds() < EPHEMERAL_WINDOW_MS
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn settings(owner: Uuid, counterpart: Uuid, ephemeral: bool) -> ConversationSettings {
        ConversationSettings {
            id: Uuid::new_v4(),
            owner_id: owner,
            counterpart_id: counterpart,
            nickname: None,
            read_receipts: true,
            ephemeral_mode: ephemeral,
        }
    }

    fn message(sender: Uuid, receiver: Uuid, age: Duration, now: DateTime<Utc>) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id: sender,
            receiver_id: receiver,
            content: "hi".into(),
            is_read: false,
            created_at: now - age,
        }
    }

    fn now() -> DateTime<Utc> {
        "2024-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn nickname_overrides_display_name() {
        let mut s = settings(Uuid::new_v4(), Uuid::new_v4(), false);
        assert_eq!(display_name(&s, "Tessia"), "Tessia");
        s.nickname = Some("bestie".into());
        assert_eq!(display_name(&s, "Tessia"), "bestie");
        s.nickname = Some(String::new());
        assert_eq!(display_name(&s, "Tessia"), "Tessia");
    }

    #[test]
    fn ephemeral_uses_or_semantics() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let off = settings(a, b, false);
        let on = settings(b, a, true);
        assert!(ephemeral_enabled(&off, &on));
        assert!(ephemeral_enabled(&on, &off));
        assert!(!ephemeral_enabled(&settings(a, b, false), &settings(b, a, false)));
    }

    #[test]
    fn disabled_filter_passes_history_through() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let history = vec![
            message(a, b, Duration::hours(48), now()),
            message(b, a, Duration::hours(1), now()),
        ];
        let filtered = filter_ephemeral(history.clone(), false, now());
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn old_messages_age_out_of_view() {
        // A (ephemeral off) and B (ephemeral on) exchanged messages at
        // T-48h and T-1h; either side's rendered thread keeps only T-1h.
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let recent = message(b, a, Duration::hours(1), now());
        let history = vec![message(a, b, Duration::hours(48), now()), recent.clone()];

        let mine = settings(a, b, false);
        let theirs = settings(b, a, true);
        let filtered =
            filter_ephemeral(history, ephemeral_enabled(&mine, &theirs), now());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, recent.id);
    }

    #[test]
    fn exact_24h_old_message_is_hidden() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let history = vec![message(a, b, Duration::hours(24), now())];
        assert!(filter_ephemeral(history, true, now()).is_empty());
    }
}
