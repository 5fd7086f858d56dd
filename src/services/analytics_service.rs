// src/services/analytics_service.rs
// DOCUMENTATION: Click tracking and per-URL analytics
// PURPOSE: Capture client metadata on redirect and aggregate it for owners

use crate::db::{ClickDimension, ClickRepository, ShortenedUrlRepository};
use crate::errors::ShortenerError;
use crate::models::{ClickEvent, NewClickEvent, UrlAnalyticsResponse};
use crate::services::user_agent::parse_user_agent;
use actix_web::http::header;
use actix_web::HttpRequest;
use sqlx::PgPool;
use std::net::IpAddr;
use uuid::Uuid;

const FALLBACK_IP: &str = "0.0.0.0";

// Column widths of click_events
const COUNTRY_MAX: usize = 2;
const CITY_MAX: usize = 100;
const BROWSER_MAX: usize = 50;
const VERSION_MAX: usize = 20;
const OS_MAX: usize = 50;
const REFERRER_MAX: usize = 2048;

/// Client facts extracted from an incoming request
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip_address: String,
    pub user_agent: String,
    pub referrer: String,
}

impl RequestMeta {
    pub fn from_request(req: &HttpRequest) -> Self {
        let header_value = |name: header::HeaderName| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        Self {
            ip_address: get_client_ip(req),
            user_agent: header_value(header::USER_AGENT),
            referrer: header_value(header::REFERER),
        }
    }
}

/// Geographic data for an IP address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoData {
    pub country: String,
    pub city: String,
}

/// Extract the real client IP from the request
/// DOCUMENTATION: First X-Forwarded-For entry wins, then the peer address
pub fn get_client_ip(req: &HttpRequest) -> String {
    let forwarded = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .and_then(|first| first.parse::<IpAddr>().ok());

    if let Some(ip) = forwarded {
        return ip.to_string();
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| FALLBACK_IP.to_string())
}

/// Look up geographic data for an IP address
/// No geo database is bundled, so lookups degrade to empty values
pub fn lookup_geo(ip_address: &str) -> GeoData {
    log::debug!("No geo database configured; skipping lookup for {}", ip_address);
    GeoData::default()
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

/// Build the click row for a request, clamped to column widths
pub fn build_click_event(meta: &RequestMeta) -> NewClickEvent {
    let ua = parse_user_agent(&meta.user_agent);
    let geo = lookup_geo(&meta.ip_address);

    NewClickEvent {
        ip_address: meta.ip_address.clone(),
        country: truncate(&geo.country, COUNTRY_MAX),
        city: truncate(&geo.city, CITY_MAX),
        browser: truncate(&ua.browser, BROWSER_MAX),
        browser_version: truncate(&ua.browser_version, VERSION_MAX),
        os: truncate(&ua.os, OS_MAX),
        os_version: truncate(&ua.os_version, VERSION_MAX),
        device_type: ua.device_type,
        referrer: truncate(&meta.referrer, REFERRER_MAX),
        user_agent: meta.user_agent.clone(),
    }
}

pub struct AnalyticsService;

impl AnalyticsService {
    /// Record a click event for a shortened URL
    /// DOCUMENTATION: Inserts the event and bumps the denormalized counter
    /// in one transaction
    pub async fn track_click(
        pool: &PgPool,
        shortened_url_id: Uuid,
        meta: &RequestMeta,
    ) -> Result<ClickEvent, ShortenerError> {
        let new_click = build_click_event(meta);

        let mut tx = pool.begin().await.map_err(|e| {
            log::error!("Failed to open click transaction: {}", e);
            ShortenerError::DatabaseError(e.to_string())
        })?;

        let click = ClickRepository::insert(&mut *tx, shortened_url_id, &new_click).await?;
        ShortenedUrlRepository::increment_click_count(&mut *tx, shortened_url_id).await?;

        tx.commit().await.map_err(|e| {
            log::error!("Failed to commit click for {}: {}", shortened_url_id, e);
            ShortenerError::DatabaseError(e.to_string())
        })?;

        Ok(click)
    }

    /// Detailed analytics for a URL owned by `owner_id`
    /// DOCUMENTATION: Deactivated URLs stay visible to their owner
    pub async fn url_analytics(
        pool: &PgPool,
        owner_id: Uuid,
        short_code: &str,
    ) -> Result<UrlAnalyticsResponse, ShortenerError> {
        let url = ShortenedUrlRepository::get_owned(pool, short_code, owner_id, false)
            .await?
            .ok_or_else(|| {
                ShortenerError::NotFound("URL not found or you don't have permission.".to_string())
            })?;

        let unique_visitors = ClickRepository::unique_visitors(pool, url.id).await?;
        let clicks_by_day = ClickRepository::clicks_by_day(pool, url.id).await?;
        let top_countries = ClickRepository::top_values(pool, url.id, ClickDimension::Country).await?;
        let top_browsers = ClickRepository::top_values(pool, url.id, ClickDimension::Browser).await?;
        let top_os = ClickRepository::top_values(pool, url.id, ClickDimension::Os).await?;
        let top_devices = ClickRepository::top_values(pool, url.id, ClickDimension::Device).await?;
        let top_referrers =
            ClickRepository::top_values(pool, url.id, ClickDimension::Referrer).await?;

        Ok(UrlAnalyticsResponse {
            short_code: url.short_code,
            original_url: url.original_url,
            total_clicks: url.click_count,
            unique_visitors,
            clicks_by_day,
            top_countries,
            top_browsers,
            top_os,
            top_devices,
            top_referrers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeviceType;
    use actix_web::test::TestRequest;

    #[test]
    fn test_ip_from_peer_addr() {
        let req = TestRequest::default()
            .peer_addr("192.168.1.1:54321".parse().unwrap())
            .to_http_request();
        assert_eq!(get_client_ip(&req), "192.168.1.1");
    }

    #[test]
    fn test_ip_from_x_forwarded_for() {
        let req = TestRequest::default()
            .peer_addr("172.16.0.1:80".parse().unwrap())
            .insert_header(("X-Forwarded-For", "10.0.0.1, 192.168.1.1"))
            .to_http_request();
        assert_eq!(get_client_ip(&req), "10.0.0.1");
    }

    #[test]
    fn test_malformed_forwarded_header_falls_back_to_peer() {
        let req = TestRequest::default()
            .peer_addr("172.16.0.1:80".parse().unwrap())
            .insert_header(("X-Forwarded-For", "not-an-ip"))
            .to_http_request();
        assert_eq!(get_client_ip(&req), "172.16.0.1");
    }

    #[test]
    fn test_ip_fallback_without_peer() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(get_client_ip(&req), "0.0.0.0");
    }

    #[test]
    fn test_request_meta_reads_headers() {
        let req = TestRequest::default()
            .peer_addr("192.168.1.1:1234".parse().unwrap())
            .insert_header((
                "User-Agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            ))
            .insert_header(("Referer", "https://google.com"))
            .to_http_request();

        let meta = RequestMeta::from_request(&req);
        assert_eq!(meta.ip_address, "192.168.1.1");
        assert_eq!(meta.referrer, "https://google.com");

        let click = build_click_event(&meta);
        assert_eq!(click.browser, "Chrome");
        assert_eq!(click.os, "Windows");
        assert_eq!(click.device_type, DeviceType::Desktop);
        assert_eq!(click.referrer, "https://google.com");
    }

    #[test]
    fn test_click_event_truncates_referrer() {
        let meta = RequestMeta {
            ip_address: "10.0.0.1".to_string(),
            user_agent: String::new(),
            referrer: format!("https://example.com/{}", "r".repeat(3000)),
        };

        let click = build_click_event(&meta);
        assert_eq!(click.referrer.chars().count(), 2048);
        assert_eq!(click.device_type, DeviceType::Unknown);
        assert_eq!(click.country, "");
    }

    #[test]
    fn test_geo_lookup_degrades_gracefully() {
        assert_eq!(lookup_geo("8.8.8.8"), GeoData::default());
    }
}
