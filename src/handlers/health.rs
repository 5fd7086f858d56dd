// src/handlers/health.rs
// DOCUMENTATION: Health check handler
// PURPOSE: Liveness endpoint that also pings the database

use crate::services::LinkCache;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

pub async fn health_check(
    pool: web::Data<PgPool>,
    cache: web::Data<Arc<LinkCache>>,
) -> impl Responder {
    let database_ok = match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => true,
        Err(e) => {
            log::warn!("Health check database ping failed: {}", e);
            false
        }
    };
    let cache_stats = cache.stats().await;

    let body = json!({
        "status": if database_ok { "ok" } else { "degraded" },
        "service": "structo-shortener",
        "version": env!("CARGO_PKG_VERSION"),
        "database": if database_ok { "ok" } else { "unavailable" },
        "cache": cache_stats,
    });

    if database_ok {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::lazy_pool;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_health_degraded_without_database() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(lazy_pool()))
                .app_data(web::Data::new(Arc::new(LinkCache::new(60))))
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["service"], "structo-shortener");
    }
}
