pub mod content;
pub mod conversation;
pub mod presence;
pub mod relationship;
pub mod visibility;

pub use presence::Presence;
pub use relationship::Relationship;
pub use visibility::Visibility;
