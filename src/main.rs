// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, and start HTTP server

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::middleware::{Compress, DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use config::Config;
use dotenv::dotenv;
use services::{start_cleanup_task, LinkCache, RateLimiters};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Housekeeping interval for cache, limiter and token cleanup
const CLEANUP_INTERVAL_SECONDS: u64 = 60;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting structo-shortener...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool (runs migrations)
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Shared state: redirect cache and rate limiters
    let cache = Arc::new(LinkCache::new(config.link_cache_ttl));
    log::info!("Initialized link cache (TTL: {}s)", config.link_cache_ttl);

    let limiters = Arc::new(
        RateLimiters::new(config.shorten_rate_limit, config.login_rate_limit)
            .with_trusted_proxies(config.trusted_proxies.clone()),
    );
    if !config.trusted_proxies.is_empty() {
        log::info!("Trusting X-Forwarded-For from {:?}", config.trusted_proxies);
    }

    start_cleanup_task(
        pool.clone(),
        cache.clone(),
        limiters.clone(),
        CLEANUP_INTERVAL_SECONDS,
    );
    log::info!(
        "Started cleanup task (interval: {}s)",
        CLEANUP_INTERVAL_SECONDS
    );

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let workers = config.server_workers;
    let request_timeout = Duration::from_secs(config.request_timeout);
    let config_clone = config.clone();

    HttpServer::new(move || {
        let mut security_headers = DefaultHeaders::new()
            .add(("X-Content-Type-Options", "nosniff"))
            .add(("X-Frame-Options", "DENY"))
            .add(("Referrer-Policy", "same-origin"));
        if config_clone.is_production() {
            security_headers = security_headers.add((
                "Strict-Transport-Security",
                "max-age=31536000; includeSubDomains; preload",
            ));
        }

        App::new()
            // Application state
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(web::Data::new(cache.clone()))
            .app_data(web::Data::new(limiters.clone()))
            .app_data(handlers::json_config())
            // Middleware
            .wrap(Logger::default())
            .wrap(Compress::default())
            .wrap(security_headers)
            // Routes; the redirect catch-all must stay last
            .configure(handlers::health_config)
            .configure(handlers::docs_config)
            .configure(handlers::api_config)
            .configure(handlers::redirect_config)
    })
    .workers(workers)
    .client_request_timeout(request_timeout)
    .bind(&server_addr)?
    .run()
    .await
}
