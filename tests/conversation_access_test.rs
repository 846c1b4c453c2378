//! Database-backed conversation tests: block gating on the thread
//! endpoints and read-flag idempotence. Run against a disposable Postgres
//! with DATABASE_URL set, e.g.
//! `DATABASE_URL=postgres://localhost/retrospace_test cargo test -- --ignored`.

use actix_web::{test, web, App};
use sqlx::PgPool;
use uuid::Uuid;

use retrospace::db::{self, message_repo, settings_repo, social_repo, user_repo};
use retrospace::models::User;
use retrospace::routes;
use retrospace::security::jwt;

async fn test_pool() -> PgPool {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for DB tests");
    let pool = db::init_pool(&url, 5).await.expect("connect");
    db::run_migrations(&pool).await.expect("migrate");
    pool
}

fn init_jwt() {
    // Shared global slot; repeated initialization across tests is harmless.
    jwt::initialize("db-test-secret", 3600).unwrap();
}

async fn make_user(pool: &PgPool, prefix: &str) -> (User, String) {
    let username = format!("{prefix}_{}", Uuid::new_v4().simple());
    let user = user_repo::create_user(pool, &username, prefix, "unused-hash")
        .await
        .expect("create user");
    let token = jwt::generate_access_token(user.id, &user.username, &user.role)
        .unwrap()
        .access_token;
    (user, token)
}

async fn befriend(pool: &PgPool, a: Uuid, b: Uuid) {
    social_repo::create_request(pool, a, b).await.expect("request");
    assert!(social_repo::accept_request(pool, a, b).await.expect("accept"));
}

#[actix_web::test]
#[ignore = "Requires PostgreSQL database"]
async fn blocked_pair_cannot_open_thread_or_mint_settings() {
    init_jwt();
    let pool = test_pool().await;
    let (viewer, viewer_token) = make_user(&pool, "viewer").await;
    let (target, _) = make_user(&pool, "target").await;

    // They were friends before the target blocked the viewer.
    befriend(&pool, viewer.id, target.id).await;
    social_repo::create_block(&pool, target.id, viewer.id)
        .await
        .expect("block");

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(routes::configure),
    )
    .await;

    let bearer = format!("Bearer {viewer_token}");

    // Opening the thread is refused outright.
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/conversations/{}", target.username))
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 403);

    // The refused open must not have created settings rows for either side.
    assert!(settings_repo::find_settings(&pool, viewer.id, target.id)
        .await
        .unwrap()
        .is_none());
    assert!(settings_repo::find_settings(&pool, target.id, viewer.id)
        .await
        .unwrap()
        .is_none());

    // Settings writes and sends are sealed the same way.
    let req = test::TestRequest::put()
        .uri(&format!(
            "/api/v1/conversations/{}/settings",
            target.username
        ))
        .insert_header(("Authorization", bearer.clone()))
        .set_json(serde_json::json!({ "ephemeral_mode": true }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 403);

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/v1/conversations/{}/messages",
            target.username
        ))
        .insert_header(("Authorization", bearer))
        .set_json(serde_json::json!({ "content": "hello?" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 403);
}

#[actix_web::test]
#[ignore = "Requires PostgreSQL database"]
async fn blocker_side_is_sealed_too() {
    init_jwt();
    let pool = test_pool().await;
    let (blocker, blocker_token) = make_user(&pool, "blocker").await;
    let (blocked, _) = make_user(&pool, "blocked").await;

    social_repo::create_block(&pool, blocker.id, blocked.id)
        .await
        .expect("block");

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/conversations/{}", blocked.username))
        .insert_header(("Authorization", format!("Bearer {blocker_token}")))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), 403);
}

#[actix_web::test]
#[ignore = "Requires PostgreSQL database"]
async fn opening_a_thread_marks_read_idempotently() {
    init_jwt();
    let pool = test_pool().await;
    let (reader, reader_token) = make_user(&pool, "reader").await;
    let (sender, _) = make_user(&pool, "sender").await;
    befriend(&pool, sender.id, reader.id).await;

    message_repo::insert_message(&pool, sender.id, reader.id, "one")
        .await
        .expect("send");
    message_repo::insert_message(&pool, sender.id, reader.id, "two")
        .await
        .expect("send");
    assert_eq!(
        message_repo::unread_count_from(&pool, reader.id, sender.id)
            .await
            .unwrap(),
        2
    );

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .configure(routes::configure),
    )
    .await;

    // Opening the thread flips both to read; reopening changes nothing.
    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/conversations/{}", sender.username))
            .insert_header(("Authorization", format!("Bearer {}", reader_token)))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), 200);
        assert_eq!(
            message_repo::unread_count_from(&pool, reader.id, sender.id)
                .await
                .unwrap(),
            0
        );
    }
}
