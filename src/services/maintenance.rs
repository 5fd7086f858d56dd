// src/services/maintenance.rs
// DOCUMENTATION: Periodic housekeeping
// PURPOSE: Sweep the link cache, forget idle rate-limit keys and purge expired tokens

use crate::db::UserRepository;
use crate::services::{LinkCache, RateLimiters};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Start background cleanup task
/// DOCUMENTATION: Runs every `interval_seconds` for the lifetime of the process
pub fn start_cleanup_task(
    pool: PgPool,
    cache: Arc<LinkCache>,
    limiters: Arc<RateLimiters>,
    interval_seconds: u64,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            cache.cleanup().await;
            limiters.retain_recent();

            match UserRepository::purge_expired_tokens(&pool).await {
                Ok(0) => {}
                Ok(purged) => log::info!("Purged {} expired API tokens", purged),
                Err(e) => log::warn!("Token purge failed: {}", e),
            }
        }
    });
}
