// src/handlers/urls.rs
// DOCUMENTATION: HTTP handlers for the URL API
// PURPOSE: Parse requests, call services, return responses

use crate::config::Config;
use crate::errors::ShortenerError;
use crate::models::{MessageResponse, ShortenUrlRequest, UrlListResponse};
use crate::services::{
    generate_qr_code_svg, AnalyticsService, AuthService, LimitedAction, LinkCache, RateLimiters,
    ShortenerService,
};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;
use validator::Validate;

/// POST /api/shorten
/// Create a shortened URL. Custom codes require authentication.
pub async fn shorten_url(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    limiters: web::Data<Arc<RateLimiters>>,
    req: HttpRequest,
    body: web::Json<ShortenUrlRequest>,
) -> Result<impl Responder, ShortenerError> {
    limiters.check_request(LimitedAction::Shorten, &req)?;

    if let Err(e) = body.validate() {
        return Err(ShortenerError::ValidationError(e.to_string()));
    }

    let user = AuthService::authenticate(pool.get_ref(), &config, &req).await?;
    let custom_code = body
        .custom_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty());

    if custom_code.is_some() && user.is_none() {
        return Err(ShortenerError::InvalidInput(
            "Authentication required for custom short codes.".to_string(),
        ));
    }

    let url = ShortenerService::create_short_url(
        pool.get_ref(),
        &config,
        &body.url,
        user.map(|u| u.id),
        custom_code,
        body.expires_at,
    )
    .await?;

    let qr_svg = generate_qr_code_svg(&url.short_url(&config.site_domain))?;

    Ok(HttpResponse::Created().json(url.to_response(&config.site_domain, Some(qr_svg))))
}

/// GET /api/urls/{short_code}
/// Public info about an active URL
pub async fn get_url_info(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    path: web::Path<String>,
) -> Result<impl Responder, ShortenerError> {
    let url = ShortenerService::get_url_info(pool.get_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(url.to_response(&config.site_domain, None)))
}

/// GET /api/urls/
/// List the authenticated user's active URLs
pub async fn list_user_urls(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
) -> Result<impl Responder, ShortenerError> {
    let user = AuthService::require_user(pool.get_ref(), &config, &req).await?;

    let urls = ShortenerService::get_user_urls(pool.get_ref(), user.id, true).await?;
    let items: Vec<UrlListResponse> = urls
        .iter()
        .map(|url| url.to_list_item(&config.site_domain))
        .collect();

    Ok(HttpResponse::Ok().json(items))
}

/// DELETE /api/urls/{short_code}
/// Soft delete; only the owner can deactivate
pub async fn delete_url(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    cache: web::Data<Arc<LinkCache>>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, ShortenerError> {
    let user = AuthService::require_user(pool.get_ref(), &config, &req).await?;

    ShortenerService::deactivate_url(pool.get_ref(), cache.get_ref(), user.id, &path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("URL deactivated successfully.")))
}

/// GET /api/urls/{short_code}/analytics
/// Detailed click analytics; owner only
pub async fn get_url_analytics(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, ShortenerError> {
    let user = AuthService::require_user(pool.get_ref(), &config, &req).await?;

    let analytics =
        AnalyticsService::url_analytics(pool.get_ref(), user.id, &path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(analytics))
}

/// Configuration for URL API routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/shorten", web::post().to(shorten_url))
            .route("/urls", web::get().to(list_user_urls))
            .route("/urls/", web::get().to(list_user_urls))
            .route("/urls/{short_code}", web::get().to(get_url_info))
            .route("/urls/{short_code}", web::delete().to(delete_url))
            .route("/urls/{short_code}/analytics", web::get().to(get_url_analytics))
            .configure(super::auth::config),
    );
}
