//! Relationship resolution between two users.
//!
//! Consumes snapshots of the friend and block edges touching a pair and
//! derives a single relationship state. Handlers pass viewer and target
//! explicitly; this module never reads request context.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{BlockEdge, FriendEdge};

pub const FRIEND_STATUS_PENDING: &str = "pending";
pub const FRIEND_STATUS_ACCEPTED: &str = "accepted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// Viewer and target are the same identity.
    SelfProfile,
    None,
    RequestSent,
    RequestReceived,
    Friends,
    /// The target has blocked the viewer. Callers must short-circuit to a
    /// hidden-profile response before surfacing any other relationship fact.
    BlockedByTarget,
    /// The viewer has blocked the target.
    BlockedTarget,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::SelfProfile => "self",
            Relationship::None => "none",
            Relationship::RequestSent => "request_sent",
            Relationship::RequestReceived => "request_received",
            Relationship::Friends => "friends",
            Relationship::BlockedByTarget => "blocked_by_target",
            Relationship::BlockedTarget => "blocked_target",
        }
    }

    pub fn is_friends(&self) -> bool {
        matches!(self, Relationship::Friends)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelationshipError {
    /// The store holds more than one friend edge for an unordered pair.
    /// Picking one silently could leak or hide a relationship, so the
    /// computation is rejected instead.
    #[error("conflicting friend edges between {a} and {b}")]
    ConflictingEdges { a: Uuid, b: Uuid },
}

/// Resolve the relationship state from `viewer` towards `target`.
///
/// Priority order, first match wins: self, blocked-by-target,
/// blocked-target, then the friend edge. A block by the target suppresses
/// every other relationship fact, including an accepted friendship that may
/// still be on record.
pub fn resolve(
    viewer: Uuid,
    target: Uuid,
    friend_edges: &[FriendEdge],
    block_edges: &[BlockEdge],
) -> Result<Relationship, RelationshipError> {
    if viewer == target {
        return Ok(Relationship::SelfProfile);
    }

    if block_edges
        .iter()
        .any(|b| b.blocker_id == target && b.blocked_id == viewer)
    {
        return Ok(Relationship::BlockedByTarget);
    }

    if block_edges
        .iter()
        .any(|b| b.blocker_id == viewer && b.blocked_id == target)
    {
        return Ok(Relationship::BlockedTarget);
    }

    let mut pair_edges = friend_edges.iter().filter(|e| {
        (e.requester_id == viewer && e.recipient_id == target)
            || (e.requester_id == target && e.recipient_id == viewer)
    });

    let edge = match pair_edges.next() {
        Some(edge) => edge,
        None => return Ok(Relationship::None),
    };
    if pair_edges.next().is_some() {
        return Err(RelationshipError::ConflictingEdges {
            a: viewer,
            b: target,
        });
    }

    if edge.status == FRIEND_STATUS_ACCEPTED {
        Ok(Relationship::Friends)
    } else if edge.requester_id == viewer {
        Ok(Relationship::RequestSent)
    } else {
        Ok(Relationship::RequestReceived)
    }
}
