// src/handlers/auth.rs
// DOCUMENTATION: Account and token endpoints under /api/auth

use crate::config::Config;
use crate::errors::ShortenerError;
use crate::models::{LoginRequest, MessageResponse, RegisterRequest};
use crate::services::{AuthService, LimitedAction, RateLimiters};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;
use validator::Validate;

/// POST /api/auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    body: web::Json<RegisterRequest>,
) -> Result<impl Responder, ShortenerError> {
    if let Err(e) = body.validate() {
        return Err(ShortenerError::ValidationError(e.to_string()));
    }

    let user = AuthService::register(pool.get_ref(), &body).await?;
    Ok(HttpResponse::Created().json(user))
}

/// POST /api/auth/login
/// Exchanges credentials for a bearer token
pub async fn login(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    limiters: web::Data<Arc<RateLimiters>>,
    req: HttpRequest,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, ShortenerError> {
    limiters.check_request(LimitedAction::Login, &req)?;

    if let Err(e) = body.validate() {
        return Err(ShortenerError::ValidationError(e.to_string()));
    }

    let token = AuthService::login(pool.get_ref(), &config, &body.username, &body.password).await?;
    Ok(HttpResponse::Ok().json(token))
}

/// POST /api/auth/logout
pub async fn logout(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, ShortenerError> {
    AuthService::logout(pool.get_ref(), &config, &req).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out.")))
}

/// Routes relative to the /api scope
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout)),
    );
}
