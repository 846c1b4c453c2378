//! Per-post visibility decisions.
//!
//! This filter is the single source of truth for who may see a post. It is
//! applied over the full candidate set in every feed and profile handler;
//! the storage layer is never assumed to pre-filter.

use uuid::Uuid;

use crate::services::relationship::Relationship;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Friends,
    /// Unrecognized tag. Fails closed: visible to the author only.
    Restricted,
}

impl Visibility {
    pub fn parse(tag: &str) -> Visibility {
        match tag {
            "public" => Visibility::Public,
            "friends" => Visibility::Friends,
            _ => Visibility::Restricted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Friends => "friends",
            Visibility::Restricted => "restricted",
        }
    }
}

/// Decide whether `viewer` (None for anonymous) may see a post by `author`.
///
/// `relationship` is the resolver's output for (viewer, author); it is only
/// consulted for friends-tagged posts and may be None for anonymous viewers.
pub fn can_view(
    author: Uuid,
    visibility: Visibility,
    viewer: Option<Uuid>,
    relationship: Option<Relationship>,
) -> bool {
    if visibility == Visibility::Public {
        return true;
    }

    let Some(viewer) = viewer else {
        return false;
    };
    if viewer == author {
        return true;
    }

    visibility == Visibility::Friends
        && relationship.is_some_and(|r| r.is_friends())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags() {
        assert_eq!(Visibility::parse("public"), Visibility::Public);
        assert_eq!(Visibility::parse("friends"), Visibility::Friends);
        assert_eq!(Visibility::parse("secret"), Visibility::Restricted);
        assert_eq!(Visibility::parse(""), Visibility::Restricted);
    }

    #[test]
    fn public_is_visible_to_everyone() {
        let author = Uuid::new_v4();
        assert!(can_view(author, Visibility::Public, None, None));
        assert!(can_view(
            author,
            Visibility::Public,
            Some(Uuid::new_v4()),
            Some(Relationship::BlockedTarget)
        ));
        assert!(can_view(
            author,
            Visibility::Public,
            Some(Uuid::new_v4()),
            Some(Relationship::None)
        ));
    }

    #[test]
    fn author_always_sees_own_post() {
        let author = Uuid::new_v4();
        assert!(can_view(author, Visibility::Friends, Some(author), None));
        assert!(can_view(author, Visibility::Restricted, Some(author), None));
    }

    #[test]
    fn friends_post_requires_friendship() {
        let author = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        assert!(can_view(
            author,
            Visibility::Friends,
            Some(viewer),
            Some(Relationship::Friends)
        ));
        assert!(!can_view(
            author,
            Visibility::Friends,
            Some(viewer),
            Some(Relationship::None)
        ));
        assert!(!can_view(
            author,
            Visibility::Friends,
            Some(viewer),
            Some(Relationship::RequestSent)
        ));
        assert!(!can_view(author, Visibility::Friends, None, None));
    }

    #[test]
    fn blocked_viewer_never_sees_friends_post() {
        let author = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        assert!(!can_view(
            author,
            Visibility::Friends,
            Some(viewer),
            Some(Relationship::BlockedByTarget)
        ));
    }

    #[test]
    fn unknown_tag_is_author_only() {
        let author = Uuid::new_v4();
        let viewer = Uuid::new_v4();
        assert!(!can_view(
            author,
            Visibility::Restricted,
            Some(viewer),
            Some(Relationship::Friends)
        ));
        assert!(!can_view(author, Visibility::Restricted, None, None));
    }
}
