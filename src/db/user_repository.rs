// src/db/user_repository.rs
// DOCUMENTATION: User and API token database operations
// PURPOSE: Accounts, credential lookup and bearer token persistence

use crate::errors::{is_unique_violation, ShortenerError};
use crate::models::User;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct UserRepository;

impl UserRepository {
    /// Create a user with an already hashed password
    pub async fn create_user(
        pool: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, ShortenerError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, is_active, created_at)
            VALUES ($1, $2, $3, $4, true, NOW())
            RETURNING id, username, email, password_hash, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return ShortenerError::AlreadyExists(format!(
                    "The username '{}' is already taken.",
                    username
                ));
            }
            log::error!("Failed to create user {}: {}", username, e);
            ShortenerError::DatabaseError(e.to_string())
        })
    }

    pub async fn get_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, ShortenerError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, is_active, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch user {}: {}", username, e);
            ShortenerError::DatabaseError(e.to_string())
        })
    }

    /// Store the digest of a freshly issued token
    pub async fn insert_token(
        pool: &PgPool,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), ShortenerError> {
        sqlx::query(
            r#"
            INSERT INTO api_tokens (id, user_id, token_hash, created_at, expires_at)
            VALUES ($1, $2, $3, NOW(), $4)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to store token for user {}: {}", user_id, e);
            ShortenerError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    /// Resolve an unexpired token digest to its active owner
    pub async fn get_user_by_token(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<User>, ShortenerError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.is_active, u.created_at
            FROM api_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = $1 AND t.expires_at > NOW() AND u.is_active = true
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            log::error!("Token lookup failed: {}", e);
            ShortenerError::DatabaseError(e.to_string())
        })
    }

    pub async fn delete_token(pool: &PgPool, token_hash: &str) -> Result<u64, ShortenerError> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to revoke token: {}", e);
                ShortenerError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }

    /// Remove expired tokens
    pub async fn purge_expired_tokens(pool: &PgPool) -> Result<u64, ShortenerError> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE expires_at <= NOW()")
            .execute(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to purge expired tokens: {}", e);
                ShortenerError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }
}
