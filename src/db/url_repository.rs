// src/db/url_repository.rs
// DOCUMENTATION: Database access layer for shortened URLs
// PURPOSE: All SQL touching the shortened_urls table

use crate::errors::{is_unique_violation, ShortenerError};
use crate::models::{NewShortenedUrl, ResolvedLink, ShortenedUrl};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const URL_COLUMNS: &str = r#"
    id, original_url, short_code, is_custom_code, created_by,
    created_at, updated_at, expires_at, is_active, click_count
"#;

/// ShortenedUrlRepository: All database operations for shortened URLs
pub struct ShortenedUrlRepository;

impl ShortenedUrlRepository {
    /// Insert a new shortened URL
    /// DOCUMENTATION: A unique violation on short_code surfaces as AlreadyExists
    /// so callers can retry with another code
    pub async fn insert(
        pool: &PgPool,
        new_url: &NewShortenedUrl,
    ) -> Result<ShortenedUrl, ShortenerError> {
        let sql = format!(
            r#"
            INSERT INTO shortened_urls (
                id, original_url, short_code, is_custom_code, created_by,
                expires_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING {}
            "#,
            URL_COLUMNS
        );

        sqlx::query_as::<_, ShortenedUrl>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_url.original_url)
            .bind(&new_url.short_code)
            .bind(new_url.is_custom_code)
            .bind(new_url.created_by)
            .bind(new_url.expires_at)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    return ShortenerError::AlreadyExists(format!(
                        "The code '{}' is already taken.",
                        new_url.short_code
                    ));
                }
                log::error!("Failed to insert short code {}: {}", new_url.short_code, e);
                ShortenerError::DatabaseError(e.to_string())
            })
    }

    /// Whether any URL (active or not) already uses this code
    pub async fn code_exists(pool: &PgPool, short_code: &str) -> Result<bool, ShortenerError> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM shortened_urls WHERE short_code = $1)")
                .bind(short_code)
                .fetch_one(pool)
                .await
                .map_err(|e| {
                    log::error!("Failed to check short code {}: {}", short_code, e);
                    ShortenerError::DatabaseError(e.to_string())
                })?;

        Ok(exists.0)
    }

    /// Fetch an active URL by code, expired or not
    pub async fn get_active_by_code(
        pool: &PgPool,
        short_code: &str,
    ) -> Result<Option<ShortenedUrl>, ShortenerError> {
        let sql = format!(
            "SELECT {} FROM shortened_urls WHERE short_code = $1 AND is_active = true",
            URL_COLUMNS
        );

        sqlx::query_as::<_, ShortenedUrl>(&sql)
            .bind(short_code)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch short code {}: {}", short_code, e);
                ShortenerError::DatabaseError(e.to_string())
            })
    }

    /// Fetch the redirect target for an active code
    /// DOCUMENTATION: Expiry is checked by the caller so cached entries can be
    /// re-checked without a round trip
    pub async fn resolve(
        pool: &PgPool,
        short_code: &str,
    ) -> Result<Option<ResolvedLink>, ShortenerError> {
        sqlx::query_as::<_, ResolvedLink>(
            r#"
            SELECT id, original_url, expires_at
            FROM shortened_urls
            WHERE short_code = $1 AND is_active = true
            "#,
        )
        .bind(short_code)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to resolve short code {}: {}", short_code, e);
            ShortenerError::DatabaseError(e.to_string())
        })
    }

    /// Fetch a URL owned by the given user
    pub async fn get_owned(
        pool: &PgPool,
        short_code: &str,
        owner_id: Uuid,
        active_only: bool,
    ) -> Result<Option<ShortenedUrl>, ShortenerError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM shortened_urls
            WHERE short_code = $1 AND created_by = $2 AND (is_active = true OR NOT $3)
            "#,
            URL_COLUMNS
        );

        sqlx::query_as::<_, ShortenedUrl>(&sql)
            .bind(short_code)
            .bind(owner_id)
            .bind(active_only)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch owned short code {}: {}", short_code, e);
                ShortenerError::DatabaseError(e.to_string())
            })
    }

    /// List a user's URLs, newest first
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<ShortenedUrl>, ShortenerError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM shortened_urls
            WHERE created_by = $1 AND (is_active = true OR NOT $2)
            ORDER BY created_at DESC
            "#,
            URL_COLUMNS
        );

        sqlx::query_as::<_, ShortenedUrl>(&sql)
            .bind(owner_id)
            .bind(active_only)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to list URLs for user {}: {}", owner_id, e);
                ShortenerError::DatabaseError(e.to_string())
            })
    }

    /// Soft delete
    /// DOCUMENTATION: Sets is_active=false instead of physical deletion
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), ShortenerError> {
        let rows = sqlx::query(
            "UPDATE shortened_urls SET is_active = false, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Deactivate failed for URL {}: {}", id, e);
            ShortenerError::DatabaseError(e.to_string())
        })?
        .rows_affected();

        if rows == 0 {
            return Err(ShortenerError::NotFound("URL not found.".to_string()));
        }

        Ok(())
    }

    /// Atomically increment the click counter
    pub async fn increment_click_count<'e, E>(executor: E, id: Uuid) -> Result<(), ShortenerError>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query("UPDATE shortened_urls SET click_count = click_count + 1 WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(|e| {
                log::error!("Failed to increment click count for {}: {}", id, e);
                ShortenerError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }
}
