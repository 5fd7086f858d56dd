// src/services/auth_service.rs
// DOCUMENTATION: Accounts and bearer-token authentication
// PURPOSE: Registration, login, token verification and logout

use crate::config::Config;
use crate::db::UserRepository;
use crate::errors::ShortenerError;
use crate::models::{RegisterRequest, TokenResponse, User, UserResponse};
use crate::services::codes::generate_api_token;
use actix_web::http::header;
use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use std::sync::OnceLock;

const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Hash verified when the username does not exist, so the response takes
/// as long as a real password check
fn dummy_password_hash() -> String {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY
        .get_or_init(|| bcrypt::hash("structo-no-such-user", BCRYPT_COST).unwrap_or_default())
        .clone()
}

/// Digest stored in place of the plain token, peppered with SECRET_KEY
pub fn hash_token(secret_key: &str, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret_key.as_bytes());
    hasher.update(b":");
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Bearer token from the Authorization header, if any
pub fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

/// Password rules applied on registration
pub fn validate_password(username: &str, password: &str) -> Result<(), ShortenerError> {
    if password.chars().count() < 8 {
        return Err(ShortenerError::ValidationError(
            "This password is too short. It must contain at least 8 characters.".to_string(),
        ));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(ShortenerError::ValidationError(
            "This password is entirely numeric.".to_string(),
        ));
    }
    if password.eq_ignore_ascii_case(username) {
        return Err(ShortenerError::ValidationError(
            "The password is too similar to the username.".to_string(),
        ));
    }
    Ok(())
}

pub struct AuthService;

impl AuthService {
    /// Create an account
    pub async fn register(
        pool: &PgPool,
        req: &RegisterRequest,
    ) -> Result<UserResponse, ShortenerError> {
        let username = req.username.trim();
        if !is_valid_username(username) {
            return Err(ShortenerError::ValidationError(
                "Username may only contain letters, digits and @/./+/-/_ characters.".to_string(),
            ));
        }
        validate_password(username, &req.password)?;

        let password = req.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
            .await
            .map_err(|e| ShortenerError::InternalError(e.to_string()))?
            .map_err(|e| ShortenerError::InternalError(e.to_string()))?;

        let user =
            UserRepository::create_user(pool, username, req.email.trim(), &password_hash).await?;

        log::info!("Registered user {}", user.username);
        Ok(user.to_response())
    }

    /// Verify credentials and issue a bearer token
    pub async fn login(
        pool: &PgPool,
        config: &Config,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse, ShortenerError> {
        let invalid = || ShortenerError::Unauthorized("Invalid username or password.".to_string());

        let user = UserRepository::get_by_username(pool, username.trim())
            .await?
            .filter(|user| user.is_active);

        // Unknown users still pay for a bcrypt verification
        let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || {
            let hash = stored_hash.unwrap_or_else(dummy_password_hash);
            bcrypt::verify(password, &hash)
        })
        .await
        .map_err(|e| ShortenerError::InternalError(e.to_string()))?
        .unwrap_or(false);

        let user = match user {
            Some(user) if verified => user,
            Some(user) => {
                log::warn!("Invalid password for user {}", user.username);
                return Err(invalid());
            }
            None => {
                log::warn!("Login attempt for unknown or inactive user {}", username);
                return Err(invalid());
            }
        };

        let token = generate_api_token();
        let expires_at = Utc::now() + Duration::hours(config.token_ttl_hours);
        UserRepository::insert_token(
            pool,
            user.id,
            &hash_token(&config.secret_key, &token),
            expires_at,
        )
        .await?;

        log::info!("Issued token for user {}", user.username);
        Ok(TokenResponse {
            token,
            token_type: "Bearer",
            expires_at,
        })
    }

    /// Resolve the request's bearer token to a user, if valid
    pub async fn authenticate(
        pool: &PgPool,
        config: &Config,
        req: &HttpRequest,
    ) -> Result<Option<User>, ShortenerError> {
        let Some(token) = bearer_token(req) else {
            return Ok(None);
        };

        let user =
            UserRepository::get_user_by_token(pool, &hash_token(&config.secret_key, &token))
                .await?;
        if user.is_none() {
            log::warn!("Rejected unknown or expired bearer token");
        }
        Ok(user)
    }

    /// Like `authenticate`, but a user is mandatory
    pub async fn require_user(
        pool: &PgPool,
        config: &Config,
        req: &HttpRequest,
    ) -> Result<User, ShortenerError> {
        if bearer_token(req).is_none() {
            return Err(ShortenerError::auth_required());
        }
        Self::authenticate(pool, config, req)
            .await?
            .ok_or_else(ShortenerError::auth_required)
    }

    /// Revoke the token presented with the request
    pub async fn logout(
        pool: &PgPool,
        config: &Config,
        req: &HttpRequest,
    ) -> Result<(), ShortenerError> {
        let token = bearer_token(req).ok_or_else(ShortenerError::auth_required)?;
        let revoked =
            UserRepository::delete_token(pool, &hash_token(&config.secret_key, &token)).await?;
        if revoked == 0 {
            return Err(ShortenerError::auth_required());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_hash_token_is_peppered() {
        let a = hash_token("secret-a", "structo_token");
        let b = hash_token("secret-b", "structo_token");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(a, hash_token("secret-a", "structo_token"));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer structo_abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("structo_abc"));

        let req = TestRequest::default()
            .insert_header(("Authorization", "bearer   structo_abc "))
            .to_http_request();
        assert_eq!(bearer_token(&req).as_deref(), Some("structo_abc"));

        let req = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwYXNz"))
            .to_http_request();
        assert!(bearer_token(&req).is_none());

        let req = TestRequest::default().to_http_request();
        assert!(bearer_token(&req).is_none());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("alice", "short").is_err());
        assert!(validate_password("alice", "1234567890").is_err());
        assert!(validate_password("alice_smith", "Alice_Smith").is_err());
        assert!(validate_password("alice", "correct horse battery").is_ok());
    }

    #[test]
    fn test_username_characters() {
        assert!(is_valid_username("alice.smith+1@example"));
        assert!(!is_valid_username("alice smith"));
        assert!(!is_valid_username(""));
    }

    #[test]
    fn test_bcrypt_round_trip() {
        let hash = bcrypt::hash("testpass123", 4).unwrap();
        assert!(bcrypt::verify("testpass123", &hash).unwrap());
        assert!(!bcrypt::verify("wrongpass", &hash).unwrap());
    }

    #[test]
    fn test_dummy_hash_is_real_and_never_matches() {
        let hash = dummy_password_hash();
        assert!(hash.starts_with("$2"));
        assert_eq!(hash, dummy_password_hash());
        assert!(!bcrypt::verify("", &hash).unwrap());
        assert!(!bcrypt::verify("correct horse battery", &hash).unwrap());
    }

    fn with_token(token: &str) -> HttpRequest {
        TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request()
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_register_login_logout_flow() {
        let pool = crate::db::test_support::test_pool().await;
        let config = crate::config::test_config();
        let username = format!("flow_{}", crate::services::codes::generate_short_code(10));
        let request = RegisterRequest {
            username: username.clone(),
            email: "flow@example.com".to_string(),
            password: "correct horse battery".to_string(),
        };

        let user = AuthService::register(&pool, &request).await.unwrap();
        assert_eq!(user.username, username);

        let duplicate = AuthService::register(&pool, &request).await;
        assert!(matches!(duplicate, Err(ShortenerError::AlreadyExists(_))));

        let wrong = AuthService::login(&pool, &config, &username, "not the password").await;
        assert!(matches!(wrong, Err(ShortenerError::Unauthorized(_))));
        match AuthService::login(&pool, &config, "no_such_user_anywhere", "whatever pass").await {
            Err(ShortenerError::Unauthorized(detail)) => {
                assert_eq!(detail, "Invalid username or password.")
            }
            _ => panic!("unknown user must be rejected"),
        }

        let token = AuthService::login(&pool, &config, &username, "correct horse battery")
            .await
            .unwrap()
            .token;
        let req = with_token(&token);

        let found = AuthService::authenticate(&pool, &config, &req).await.unwrap();
        assert_eq!(found.map(|u| u.username), Some(username));

        AuthService::logout(&pool, &config, &req).await.unwrap();
        assert!(AuthService::authenticate(&pool, &config, &req)
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            AuthService::logout(&pool, &config, &req).await,
            Err(ShortenerError::Unauthorized(_))
        ));
    }
}
