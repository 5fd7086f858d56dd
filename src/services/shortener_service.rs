// src/services/shortener_service.rs
// DOCUMENTATION: Business logic for the URL shortener
// PURPOSE: Intermediary between handlers and repository: code allocation,
// resolution, deactivation and listing

use crate::config::Config;
use crate::db::ShortenedUrlRepository;
use crate::errors::ShortenerError;
use crate::models::{NewShortenedUrl, ResolvedLink, ShortenedUrl};
use crate::services::codes::{
    candidate_lengths, generate_short_code, is_reserved_code, is_valid_custom_code,
    normalize_custom_code,
};
use crate::services::LinkCache;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub const MAX_URL_LENGTH: usize = 2048;

const ALLOWED_SCHEMES: &[&str] = &["http://", "https://", "ftp://", "ftps://"];

/// Check that a destination is an absolute URL we are willing to redirect to
pub fn validate_destination(url: &str) -> Result<(), ShortenerError> {
    if url.is_empty() || url.chars().count() > MAX_URL_LENGTH {
        return Err(ShortenerError::InvalidUrl(format!(
            "URL must be between 1 and {} characters.",
            MAX_URL_LENGTH
        )));
    }

    let lower = url.to_ascii_lowercase();
    let has_allowed_scheme = ALLOWED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme));
    if !has_allowed_scheme || !validator::validate_url(url) {
        return Err(ShortenerError::InvalidUrl("Enter a valid URL.".to_string()));
    }

    Ok(())
}

pub struct ShortenerService;

impl ShortenerService {
    /// Create a shortened URL
    /// DOCUMENTATION: With a custom code the code is validated and must be free;
    /// otherwise random codes are tried with growing length until one inserts
    pub async fn create_short_url(
        pool: &PgPool,
        config: &Config,
        original_url: &str,
        owner_id: Option<Uuid>,
        custom_code: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortenedUrl, ShortenerError> {
        let original_url = original_url.trim();
        validate_destination(original_url)?;

        if let Some(expires_at) = expires_at {
            if expires_at <= Utc::now() {
                return Err(ShortenerError::ValidationError(
                    "Expiration date must be in the future.".to_string(),
                ));
            }
        }

        if let Some(custom_code) = custom_code {
            return Self::create_with_custom_code(
                pool,
                original_url,
                owner_id,
                custom_code,
                expires_at,
            )
            .await;
        }

        for (attempt, length) in candidate_lengths(config.code_length, config.max_retries).enumerate() {
            let code = generate_short_code(length);
            let new_url = NewShortenedUrl {
                original_url: original_url.to_string(),
                short_code: code.clone(),
                is_custom_code: false,
                created_by: owner_id,
                expires_at,
            };

            match ShortenedUrlRepository::insert(pool, &new_url).await {
                Ok(url) => {
                    log::info!("Created short code {} for {}", url.short_code, url.original_url);
                    return Ok(url);
                }
                Err(ShortenerError::AlreadyExists(_)) => {
                    log::warn!("Short code collision on attempt {}: {}", attempt + 1, code);
                }
                Err(e) => return Err(e),
            }
        }

        log::error!(
            "Exhausted {} attempts generating a short code",
            config.max_retries
        );
        Err(ShortenerError::CodeGenerationExhausted)
    }

    async fn create_with_custom_code(
        pool: &PgPool,
        original_url: &str,
        owner_id: Option<Uuid>,
        custom_code: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortenedUrl, ShortenerError> {
        let code = normalize_custom_code(custom_code);
        if !is_valid_custom_code(&code) {
            return Err(ShortenerError::InvalidCode(
                "Custom code must be 3-20 characters, alphanumeric and hyphens only, \
                 cannot start or end with a hyphen."
                    .to_string(),
            ));
        }
        if is_reserved_code(&code) {
            return Err(ShortenerError::InvalidCode(format!(
                "The code '{}' is reserved.",
                code
            )));
        }
        if ShortenedUrlRepository::code_exists(pool, &code).await? {
            return Err(ShortenerError::AlreadyExists(format!(
                "The code '{}' is already taken.",
                code
            )));
        }

        // A concurrent insert of the same code still surfaces as AlreadyExists
        let url = ShortenedUrlRepository::insert(
            pool,
            &NewShortenedUrl {
                original_url: original_url.to_string(),
                short_code: code,
                is_custom_code: true,
                created_by: owner_id,
                expires_at,
            },
        )
        .await?;

        log::info!("Created custom short code {}", url.short_code);
        Ok(url)
    }

    /// Look up an active, non-expired link for a redirect
    /// DOCUMENTATION: Served from the cache when possible; expiry is rechecked
    /// on every hit
    pub async fn resolve_url(
        pool: &PgPool,
        cache: &LinkCache,
        short_code: &str,
    ) -> Result<Option<ResolvedLink>, ShortenerError> {
        let now = Utc::now();

        if let Some(link) = cache.get(short_code).await {
            if link.is_expired_at(now) {
                cache.invalidate(short_code).await;
                return Ok(None);
            }
            return Ok(Some(link));
        }

        let Some(link) = ShortenedUrlRepository::resolve(pool, short_code).await? else {
            return Ok(None);
        };

        if link.is_expired_at(now) {
            return Ok(None);
        }

        cache.set(short_code.to_string(), link.clone()).await;
        Ok(Some(link))
    }

    /// Public info about an active URL
    pub async fn get_url_info(pool: &PgPool, short_code: &str) -> Result<ShortenedUrl, ShortenerError> {
        let url = ShortenedUrlRepository::get_active_by_code(pool, short_code)
            .await?
            .ok_or_else(|| ShortenerError::NotFound("URL not found.".to_string()))?;

        if url.is_expired() {
            return Err(ShortenerError::NotFound("This URL has expired.".to_string()));
        }

        Ok(url)
    }

    /// Soft-delete a URL; only its owner may do so
    pub async fn deactivate_url(
        pool: &PgPool,
        cache: &LinkCache,
        owner_id: Uuid,
        short_code: &str,
    ) -> Result<(), ShortenerError> {
        let url = ShortenedUrlRepository::get_owned(pool, short_code, owner_id, true)
            .await?
            .ok_or_else(|| {
                ShortenerError::NotFound("URL not found or you don't have permission.".to_string())
            })?;

        ShortenedUrlRepository::deactivate(pool, url.id).await?;
        cache.invalidate(&url.short_code).await;

        log::info!("Deactivated short code {}", url.short_code);
        Ok(())
    }

    /// All URLs for a user, newest first
    pub async fn get_user_urls(
        pool: &PgPool,
        owner_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<ShortenedUrl>, ShortenerError> {
        ShortenedUrlRepository::list_by_owner(pool, owner_id, active_only).await
    }
}
