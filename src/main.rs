use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use retrospace::middleware::PresenceTouch;
use retrospace::{db, routes, security, Config};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    init_tracing(config.is_production());

    tracing::info!(
        env = %config.app.env,
        "Starting retrospace v{}",
        env!("CARGO_PKG_VERSION")
    );

    security::jwt::initialize(&config.jwt.secret, config.jwt.access_token_ttl)
        .context("Failed to initialize JWT signing")?;

    let pool = db::init_pool(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;

    // The schema must be current before the server takes traffic.
    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    let bind_addr = (config.app.host.clone(), config.app.port);
    tracing::info!("Listening on {}:{}", bind_addr.0, bind_addr.1);

    let server_pool = pool.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(server_pool.clone()))
            .wrap(TracingLogger::default())
            .wrap(cors)
            .wrap(PresenceTouch::new(server_pool.clone()))
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
