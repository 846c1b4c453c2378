pub mod jwt_auth;
pub mod presence;

pub use jwt_auth::{AuthUser, JwtAuthMiddleware, MaybeUser};
pub use presence::PresenceTouch;
