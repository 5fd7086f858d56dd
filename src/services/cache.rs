// src/services/cache.rs
// DOCUMENTATION: In-memory cache for redirect lookups
// PURPOSE: Serve hot short codes without a database round trip

use crate::models::ResolvedLink;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// A cached link and the instant it goes stale
#[derive(Clone, Debug)]
struct CachedLink {
    link: ResolvedLink,
    stale_at: Instant,
}

impl CachedLink {
    fn is_stale(&self, now: Instant) -> bool {
        now > self.stale_at
    }
}

/// Thread-safe TTL cache keyed by short code
/// DOCUMENTATION: Entries must be invalidated when a URL is deactivated
pub struct LinkCache {
    store: Arc<RwLock<HashMap<String, CachedLink>>>,
    default_ttl: Duration,
}

impl LinkCache {
    /// Create new cache with default TTL
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            store: Arc::new(RwLock::new(HashMap::new())),
            default_ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Get cached link
    pub async fn get(&self, short_code: &str) -> Option<ResolvedLink> {
        let store = self.store.read().await;

        match store.get(short_code) {
            Some(entry) if !entry.is_stale(Instant::now()) => {
                log::debug!("Cache HIT for code: {}", short_code);
                Some(entry.link.clone())
            }
            Some(_) => {
                log::debug!("Cache EXPIRED for code: {}", short_code);
                None
            }
            None => {
                log::debug!("Cache MISS for code: {}", short_code);
                None
            }
        }
    }

    /// Set cached link with default TTL
    pub async fn set(&self, short_code: String, link: ResolvedLink) {
        self.set_with_ttl(short_code, link, self.default_ttl).await;
    }

    /// Set cached link with custom TTL
    pub async fn set_with_ttl(&self, short_code: String, link: ResolvedLink, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let mut store = self.store.write().await;
        log::debug!("Cache SET for code: {} (TTL: {}s)", short_code, ttl.as_secs());
        store.insert(
            short_code,
            CachedLink {
                link,
                stale_at: Instant::now() + ttl,
            },
        );
    }

    /// Drop a single entry
    pub async fn invalidate(&self, short_code: &str) {
        let mut store = self.store.write().await;
        if store.remove(short_code).is_some() {
            log::debug!("Cache INVALIDATE for code: {}", short_code);
        }
    }

    /// Sweep stale entries
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_stale(now));
        let removed = before - store.len();

        if removed > 0 {
            log::info!(
                "Link cache sweep: dropped {} stale entries ({} remaining)",
                removed,
                store.len()
            );
        }
    }

    /// Entry counts reported by /health
    pub async fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let store = self.store.read().await;
        let stale_entries = store.values().filter(|e| e.is_stale(now)).count();

        CacheStats {
            total_entries: store.len(),
            expired_entries: stale_entries,
            active_entries: store.len() - stale_entries,
        }
    }
}

/// Link cache statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
}
