use actix_web::web;

use crate::handlers::{auth, comments, health, likes, messages, posts, relationships, users};
use crate::middleware::JwtAuthMiddleware;

/// Route table. Anonymous-friendly routes sit directly under `/api/v1`;
/// everything else lives in a nested scope behind the JWT middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health))
        .route("/health/live", web::get().to(health::liveness))
        .route("/health/ready", web::get().to(health::readiness))
        .service(
            web::scope("/api/v1")
                .route("/auth/register", web::post().to(auth::register))
                .route("/auth/login", web::post().to(auth::login))
                .route("/feed", web::get().to(posts::feed))
                .route("/users/{username}", web::get().to(users::get_profile))
                .service(
                    web::scope("")
                        .wrap(JwtAuthMiddleware)
                        .route("/auth/logout", web::post().to(auth::logout))
                        .route("/auth/me", web::get().to(auth::me))
                        .route("/users/me", web::put().to(users::update_me))
                        .route("/posts", web::post().to(posts::create_post))
                        .route("/posts/{id}", web::delete().to(posts::delete_post))
                        .route(
                            "/posts/{id}/comments",
                            web::post().to(comments::create_comment),
                        )
                        .route("/comments/{id}", web::delete().to(comments::delete_comment))
                        .route(
                            "/likes/{item_type}/{item_id}",
                            web::post().to(likes::toggle),
                        )
                        .route(
                            "/users/{id}/friend-request",
                            web::post().to(relationships::friend_request),
                        )
                        .route(
                            "/users/{id}/friend-accept",
                            web::post().to(relationships::friend_accept),
                        )
                        .route(
                            "/users/{id}/friend",
                            web::delete().to(relationships::friend_remove),
                        )
                        .route("/users/{id}/block", web::post().to(relationships::block))
                        .route("/users/{id}/block", web::delete().to(relationships::unblock))
                        .route(
                            "/friend-requests",
                            web::get().to(relationships::pending_requests),
                        )
                        .route(
                            "/conversations",
                            web::get().to(messages::list_conversations),
                        )
                        .route(
                            "/conversations/{username}",
                            web::get().to(messages::get_thread),
                        )
                        .route(
                            "/conversations/{username}/messages",
                            web::post().to(messages::send_message),
                        )
                        .route(
                            "/conversations/{username}/settings",
                            web::put().to(messages::update_settings),
                        )
                        .route(
                            "/messages/unread-count",
                            web::get().to(messages::unread_count),
                        ),
                ),
        );
}
