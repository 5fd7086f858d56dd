// src/errors.rs
// DOCUMENTATION: Custom error types and HTTP responses
// PURPOSE: Centralized error handling for entire application

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;

/// Application-specific error types
/// DOCUMENTATION: Every failure a handler can surface
/// Each variant maps to an HTTP status code and a `{"detail": ...}` body
#[derive(Error, Debug)]
pub enum ShortenerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    InvalidCode(String),

    #[error("{0}")]
    InvalidUrl(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Unable to generate a unique short code. Please try again.")]
    CodeGenerationExhausted,

    #[error("{0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded. Please slow down.")]
    RateLimitExceeded,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ShortenerError {
    /// Shorthand for the 401 returned by endpoints that need a user
    pub fn auth_required() -> Self {
        ShortenerError::Unauthorized("Authentication required.".to_string())
    }

    fn error_code(&self) -> &'static str {
        match self {
            ShortenerError::NotFound(_) => "NOT_FOUND",
            ShortenerError::AlreadyExists(_) => "ALREADY_EXISTS",
            ShortenerError::InvalidCode(_) => "INVALID_CODE",
            ShortenerError::InvalidUrl(_) => "INVALID_URL",
            ShortenerError::InvalidInput(_) => "INVALID_INPUT",
            ShortenerError::ValidationError(_) => "VALIDATION_ERROR",
            ShortenerError::CodeGenerationExhausted => "CODE_GENERATION_FAILED",
            ShortenerError::Unauthorized(_) => "UNAUTHORIZED",
            ShortenerError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ShortenerError::DatabaseError(_) => "DATABASE_ERROR",
            ShortenerError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Message exposed to clients; server-side failures are not leaked
    fn public_detail(&self) -> String {
        match self {
            ShortenerError::DatabaseError(_) | ShortenerError::InternalError(_) => {
                "Internal server error.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Convert ShortenerError to HTTP response
/// DOCUMENTATION: Maps error types to HTTP status codes and JSON responses
impl ResponseError for ShortenerError {
    fn error_response(&self) -> HttpResponse {
        let body = json!({
            "detail": self.public_detail(),
            "code": self.error_code(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ShortenerError::NotFound(_) => StatusCode::NOT_FOUND,
            ShortenerError::AlreadyExists(_) => StatusCode::CONFLICT,
            ShortenerError::InvalidCode(_)
            | ShortenerError::InvalidUrl(_)
            | ShortenerError::InvalidInput(_)
            | ShortenerError::ValidationError(_)
            | ShortenerError::CodeGenerationExhausted => StatusCode::BAD_REQUEST,
            ShortenerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ShortenerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ShortenerError::DatabaseError(_) | ShortenerError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// True when a sqlx error is a unique-constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
