// src/models/shortened_url.rs
// DOCUMENTATION: Core data structures for shortened URLs
// PURPOSE: Database row mapping plus the request/response DTOs of the URL API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// A shortened URL mapping
/// DOCUMENTATION: Maps directly to the shortened_urls table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ShortenedUrl {
    /// Unique identifier (UUID v4)
    pub id: Uuid,

    /// Destination of the redirect
    pub original_url: String,

    /// Public code, unique across active and inactive URLs
    pub short_code: String,

    /// Whether the short code was chosen by the user
    pub is_custom_code: bool,

    /// Owner (None for anonymous links or deleted users)
    pub created_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Optional expiration date. None means never expires.
    pub expires_at: Option<DateTime<Utc>>,

    /// Soft delete flag
    pub is_active: bool,

    /// Denormalized click counter for fast reads
    pub click_count: i64,
}

impl ShortenedUrl {
    /// Check if the URL has expired relative to `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Full public short URL for the given site origin
    pub fn short_url(&self, site_domain: &str) -> String {
        build_short_url(site_domain, &self.short_code)
    }

    /// Convert to API response DTO
    pub fn to_response(&self, site_domain: &str, qr_code_svg: Option<String>) -> ShortenedUrlResponse {
        ShortenedUrlResponse {
            short_code: self.short_code.clone(),
            short_url: self.short_url(site_domain),
            original_url: self.original_url.clone(),
            created_at: self.created_at,
            click_count: self.click_count,
            is_custom_code: self.is_custom_code,
            expires_at: self.expires_at,
            qr_code_svg,
        }
    }

    /// Convert to the listing DTO used by GET /api/urls/
    pub fn to_list_item(&self, site_domain: &str) -> UrlListResponse {
        UrlListResponse {
            short_code: self.short_code.clone(),
            short_url: self.short_url(site_domain),
            original_url: self.original_url.clone(),
            created_at: self.created_at,
            click_count: self.click_count,
            is_active: self.is_active,
            is_custom_code: self.is_custom_code,
        }
    }
}

impl fmt::Display for ShortenedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.original_url.chars().take(80).collect();
        write!(f, "{} → {}", self.short_code, preview)
    }
}

pub fn build_short_url(site_domain: &str, short_code: &str) -> String {
    format!("{}/{}", site_domain.trim_end_matches('/'), short_code)
}

/// Minimal view of a URL needed to serve a redirect
/// DOCUMENTATION: This is what the link cache stores
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ResolvedLink {
    pub id: Uuid,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ResolvedLink {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expires_at| now >= expires_at)
    }
}

/// Fields needed to insert a new shortened URL
#[derive(Debug, Clone)]
pub struct NewShortenedUrl {
    pub original_url: String,
    pub short_code: String,
    pub is_custom_code: bool,
    pub created_by: Option<Uuid>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Request body for POST /api/shorten
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ShortenUrlRequest {
    /// The URL to shorten
    #[validate(length(min = 1, max = 2048))]
    pub url: String,

    /// Optional user-chosen short code (authentication required)
    #[serde(default)]
    pub custom_code: Option<String>,

    /// Optional expiration timestamp (must be in the future)
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Response body for a shortened URL
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenedUrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
    pub is_custom_code: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub qr_code_svg: Option<String>,
}

/// Response body for listing a user's URLs
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlListResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
    pub is_active: bool,
    pub is_custom_code: bool,
}

/// Simple message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
