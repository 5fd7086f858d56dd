// src/models/click.rs
// DOCUMENTATION: Click analytics data structures
// PURPOSE: Click events recorded on redirect and the analytics response DTOs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Device class derived from the User-Agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    Desktop,
    Bot,
    #[default]
    Unknown,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
            DeviceType::Bot => "bot",
            DeviceType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decodes the stored column; unrecognised values fall back to Unknown
impl From<String> for DeviceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "mobile" => DeviceType::Mobile,
            "tablet" => DeviceType::Tablet,
            "desktop" => DeviceType::Desktop,
            "bot" => DeviceType::Bot,
            _ => DeviceType::Unknown,
        }
    }
}

/// Records a single click/redirect event
/// DOCUMENTATION: Maps directly to the click_events table
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ClickEvent {
    pub id: i64,
    pub shortened_url_id: Uuid,
    pub clicked_at: DateTime<Utc>,
    pub ip_address: String,
    pub country: String,
    pub city: String,
    pub browser: String,
    pub browser_version: String,
    pub os: String,
    pub os_version: String,
    #[sqlx(try_from = "String")]
    pub device_type: DeviceType,
    pub referrer: String,
    pub user_agent: String,
}

/// Click data captured from a request, before insertion
#[derive(Debug, Clone, Default)]
pub struct NewClickEvent {
    pub ip_address: String,
    pub country: String,
    pub city: String,
    pub browser: String,
    pub browser_version: String,
    pub os: String,
    pub os_version: String,
    pub device_type: DeviceType,
    pub referrer: String,
    pub user_agent: String,
}

/// Clicks aggregated per UTC day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyClicks {
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    pub count: i64,
}

impl DailyClicks {
    pub fn new(date: NaiveDate, count: i64) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            count,
        }
    }
}

/// A single bucket of a "top N" breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct NamedCount {
    pub name: String,
    pub count: i64,
}

/// Response body for URL analytics
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlAnalyticsResponse {
    pub short_code: String,
    pub original_url: String,
    pub total_clicks: i64,
    pub unique_visitors: i64,
    pub clicks_by_day: Vec<DailyClicks>,
    pub top_countries: Vec<NamedCount>,
    pub top_browsers: Vec<NamedCount>,
    pub top_os: Vec<NamedCount>,
    pub top_devices: Vec<NamedCount>,
    pub top_referrers: Vec<NamedCount>,
}
