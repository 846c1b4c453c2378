//! Scenario tests over the pure resolution engine: relationship,
//! visibility, presence and conversation policy composed the way the
//! handlers compose them, with no database involved.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use retrospace::models::{BlockEdge, ConversationSettings, FriendEdge, Message};
use retrospace::services::conversation;
use retrospace::services::presence::{self, Presence};
use retrospace::services::relationship::{self, Relationship, FRIEND_STATUS_ACCEPTED, FRIEND_STATUS_PENDING};
use retrospace::services::visibility::{self, Visibility};

fn friend_edge(requester: Uuid, recipient: Uuid, status: &str) -> FriendEdge {
    FriendEdge {
        id: Uuid::new_v4(),
        requester_id: requester,
        recipient_id: recipient,
        status: status.to_string(),
        created_at: Utc::now(),
    }
}

fn block_edge(blocker: Uuid, blocked: Uuid) -> BlockEdge {
    BlockEdge {
        id: Uuid::new_v4(),
        blocker_id: blocker,
        blocked_id: blocked,
        created_at: Utc::now(),
    }
}

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

fn message_at(sender: Uuid, receiver: Uuid, at: DateTime<Utc>) -> Message {
    Message {
        id: Uuid::new_v4(),
        sender_id: sender,
        receiver_id: receiver,
        content: "hi".into(),
        is_read: false,
        created_at: at,
    }
}

#[test]
fn resolve_is_mirror_consistent_for_friend_states() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    // No edges: both sides see "none".
    assert_eq!(
        relationship::resolve(a, b, &[], &[]).unwrap(),
        Relationship::None
    );
    assert_eq!(
        relationship::resolve(b, a, &[], &[]).unwrap(),
        Relationship::None
    );

    // Pending request from a: sender sees sent, recipient sees received.
    let pending = [friend_edge(a, b, FRIEND_STATUS_PENDING)];
    assert_eq!(
        relationship::resolve(a, b, &pending, &[]).unwrap(),
        Relationship::RequestSent
    );
    assert_eq!(
        relationship::resolve(b, a, &pending, &[]).unwrap(),
        Relationship::RequestReceived
    );

    // Accepted: symmetric.
    let accepted = [friend_edge(a, b, FRIEND_STATUS_ACCEPTED)];
    assert_eq!(
        relationship::resolve(a, b, &accepted, &[]).unwrap(),
        Relationship::Friends
    );
    assert_eq!(
        relationship::resolve(b, a, &accepted, &[]).unwrap(),
        Relationship::Friends
    );
}

#[test]
fn resolve_self_wins_over_everything() {
    let a = Uuid::new_v4();
    let edges = [friend_edge(a, a, FRIEND_STATUS_ACCEPTED)];
    assert_eq!(
        relationship::resolve(a, a, &edges, &[]).unwrap(),
        Relationship::SelfProfile
    );
}

#[test]
fn block_overrides_accepted_friendship() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let friends = [friend_edge(a, b, FRIEND_STATUS_ACCEPTED)];
    let blocks = [block_edge(b, a)];

    assert_eq!(
        relationship::resolve(a, b, &friends, &blocks).unwrap(),
        Relationship::BlockedByTarget
    );
    assert_eq!(
        relationship::resolve(b, a, &friends, &blocks).unwrap(),
        Relationship::BlockedTarget
    );
}

#[test]
fn duplicate_friend_edges_are_rejected_not_picked() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let edges = [
        friend_edge(a, b, FRIEND_STATUS_PENDING),
        friend_edge(b, a, FRIEND_STATUS_ACCEPTED),
    ];
    assert!(relationship::resolve(a, b, &edges, &[]).is_err());
}

#[test]
fn public_posts_are_visible_to_everyone() {
    let author = Uuid::new_v4();
    let stranger = Uuid::new_v4();

    assert!(visibility::can_view(author, Visibility::Public, None, None));
    assert!(visibility::can_view(
        author,
        Visibility::Public,
        Some(stranger),
        Some(Relationship::None)
    ));
}

#[test]
fn friends_posts_require_author_or_friendship() {
    let author = Uuid::new_v4();
    let viewer = Uuid::new_v4();

    assert!(visibility::can_view(
        author,
        Visibility::Friends,
        Some(author),
        Some(Relationship::SelfProfile)
    ));
    assert!(visibility::can_view(
        author,
        Visibility::Friends,
        Some(viewer),
        Some(Relationship::Friends)
    ));

    assert!(!visibility::can_view(author, Visibility::Friends, None, None));
    assert!(!visibility::can_view(
        author,
        Visibility::Friends,
        Some(viewer),
        Some(Relationship::None)
    ));
    assert!(!visibility::can_view(
        author,
        Visibility::Friends,
        Some(viewer),
        Some(Relationship::RequestSent)
    ));
}

#[test]
fn unknown_visibility_tag_fails_closed() {
    let author = Uuid::new_v4();
    let friend = Uuid::new_v4();
    let vis = Visibility::parse("everyone");

    // Even an accepted friend cannot see an unknown tag; only the author.
    assert!(!visibility::can_view(
        author,
        vis,
        Some(friend),
        Some(Relationship::Friends)
    ));
    assert!(visibility::can_view(author, vis, Some(author), None));
}

#[test]
fn friends_only_post_appears_after_acceptance() {
    let author = Uuid::new_v4();
    let viewer = Uuid::new_v4();

    let before = relationship::resolve(
        viewer,
        author,
        &[friend_edge(viewer, author, FRIEND_STATUS_PENDING)],
        &[],
    )
    .unwrap();
    assert!(!visibility::can_view(
        author,
        Visibility::Friends,
        Some(viewer),
        Some(before)
    ));

    let after = relationship::resolve(
        viewer,
        author,
        &[friend_edge(viewer, author, FRIEND_STATUS_ACCEPTED)],
        &[],
    )
    .unwrap();
    assert!(visibility::can_view(
        author,
        Visibility::Friends,
        Some(viewer),
        Some(after)
    ));
}

#[test]
fn presence_boundaries() {
    let now = Utc::now();
    let at = |d: Duration| Some(now - d);

    assert_eq!(presence::classify(None, now), Presence::Offline);
    assert_eq!(
        presence::classify(at(Duration::seconds(4 * 60 + 59)), now),
        Presence::Online
    );
    assert_eq!(
        presence::classify(at(Duration::minutes(5)), now),
        Presence::Idle
    );
    assert_eq!(
        presence::classify(at(Duration::minutes(60)), now),
        Presence::Idle
    );
    assert_eq!(
        presence::classify(at(Duration::seconds(60 * 60 + 1)), now),
        Presence::Offline
    );
}

#[test]
fn ephemeral_applies_when_either_side_enables_it() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    let mine_off = settings(a, b, false);
    let theirs_off = settings(b, a, false);
    let theirs_on = settings(b, a, true);

    assert!(!conversation::ephemeral_enabled(&mine_off, &theirs_off));
    assert!(conversation::ephemeral_enabled(&mine_off, &theirs_on));
}

#[test]
fn ephemeral_window_hides_old_messages_without_deleting_recent() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let now = Utc::now();

    // One message two days old, one from an hour ago.
    let history = vec![
        message_at(a, b, now - Duration::hours(48)),
        message_at(b, a, now - Duration::hours(1)),
    ];

    let visible = conversation::filter_ephemeral(history.clone(), true, now);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].sender_id, b);

    // With the filter off the full history is intact.
    let all = conversation::filter_ephemeral(history, false, now);
    assert_eq!(all.len(), 2);
}

#[test]
fn nickname_override_is_render_time_only() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    let mut mine = settings(a, b, false);
    assert_eq!(conversation::display_name(&mine, "Starla"), "Starla");

    mine.nickname = Some("bestie".into());
    assert_eq!(conversation::display_name(&mine, "Starla"), "bestie");

    // An empty nickname is treated as unset.
    mine.nickname = Some(String::new());
    assert_eq!(conversation::display_name(&mine, "Starla"), "Starla");
}
