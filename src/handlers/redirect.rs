// src/handlers/redirect.rs
// DOCUMENTATION: Short code redirect
// PURPOSE: Resolve /{short_code}, record the click, answer 302

use crate::config::env::MAX_SHORT_CODE_LENGTH;
use crate::errors::ShortenerError;
use crate::services::{AnalyticsService, LinkCache, RequestMeta, ShortenerService};
use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use sqlx::PgPool;
use std::sync::Arc;

/// GET /{short_code}
pub async fn redirect_to_url(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<LinkCache>>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<impl Responder, ShortenerError> {
    let short_code = path.into_inner();
    let not_found = || ShortenerError::NotFound("Short URL not found or has expired.".to_string());

    if short_code.is_empty() || short_code.chars().count() > MAX_SHORT_CODE_LENGTH {
        return Err(not_found());
    }

    let link = ShortenerService::resolve_url(pool.get_ref(), cache.get_ref(), &short_code)
        .await?
        .ok_or_else(not_found)?;

    // A lost click never blocks the redirect
    let meta = RequestMeta::from_request(&req);
    if let Err(e) = AnalyticsService::track_click(pool.get_ref(), link.id, &meta).await {
        log::warn!("Failed to record click for {}: {}", short_code, e);
    }

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, link.original_url))
        .finish())
}

/// Catch-all route; register after every other route
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/{short_code}", web::get().to(redirect_to_url));
}
