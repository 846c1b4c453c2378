/// Presence touch middleware: every request carrying a valid bearer token
/// refreshes the caller's `last_active` timestamp. The write is spawned
/// fire-and-forget so request latency is unaffected; a failed touch only
/// degrades the presence label, never the request.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error,
};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use std::rc::Rc;
use uuid::Uuid;

use crate::db::user_repo;
use crate::security::jwt;

pub struct PresenceTouch {
    pool: PgPool,
}

impl PresenceTouch {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<S, B> Transform<S, ServiceRequest> for PresenceTouch
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = PresenceTouchService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(PresenceTouchService {
            service: Rc::new(service),
            pool: self.pool.clone(),
        }))
    }
}

pub struct PresenceTouchService<S> {
    service: Rc<S>,
    pool: PgPool,
}

impl<S, B> Service<ServiceRequest> for PresenceTouchService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(user_id) = bearer_user_id(&req) {
            let pool = self.pool.clone();
            tokio::spawn(async move {
                if let Err(e) = user_repo::touch_last_active(&pool, user_id).await {
                    tracing::warn!("Failed to touch last_active for {}: {}", user_id, e);
                }
            });
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

fn bearer_user_id(req: &ServiceRequest) -> Option<Uuid> {
    let header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    let data = jwt::validate_token(token).ok()?;
    Uuid::parse_str(&data.claims.sub).ok()
}
