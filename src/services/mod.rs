// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod analytics_service;
pub mod auth_service;
pub mod cache;
pub mod codes;
pub mod maintenance;
pub mod qr;
pub mod rate_limit;
pub mod shortener_service;
pub mod user_agent;

pub use analytics_service::{AnalyticsService, RequestMeta};
pub use auth_service::AuthService;
pub use cache::*;
pub use maintenance::start_cleanup_task;
pub use qr::generate_qr_code_svg;
pub use rate_limit::{LimitedAction, RateLimiters};
pub use shortener_service::ShortenerService;
