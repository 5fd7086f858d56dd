// src/handlers/docs.rs
// DOCUMENTATION: API description endpoint
// PURPOSE: Self-describing index of the HTTP API; also the container health check target

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct EndpointDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub summary: &'static str,
    pub tag: &'static str,
    pub auth: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ApiDocs {
    pub title: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointDoc>,
}

const fn endpoint(
    method: &'static str,
    path: &'static str,
    summary: &'static str,
    tag: &'static str,
    auth: &'static str,
) -> EndpointDoc {
    EndpointDoc {
        method,
        path,
        summary,
        tag,
        auth,
    }
}

pub fn api_docs() -> ApiDocs {
    ApiDocs {
        title: "Structo URL Shortener API",
        version: "1.0.0",
        description: "A modern, fast URL shortening service. \
                      Shorten URLs, track clicks, and view analytics. \
                      Authenticated endpoints expect `Authorization: Bearer <token>` \
                      obtained from POST /api/auth/login.",
        endpoints: vec![
            endpoint("POST", "/api/shorten", "Shorten a URL", "URLs", "optional"),
            endpoint("GET", "/api/urls/{short_code}", "Get URL info", "URLs", "none"),
            endpoint("GET", "/api/urls/", "List your URLs", "User URLs", "required"),
            endpoint("DELETE", "/api/urls/{short_code}", "Deactivate a URL", "User URLs", "owner"),
            endpoint("GET", "/api/urls/{short_code}/analytics", "URL analytics", "Analytics", "owner"),
            endpoint("POST", "/api/auth/register", "Create an account", "Auth", "none"),
            endpoint("POST", "/api/auth/login", "Obtain a bearer token", "Auth", "none"),
            endpoint("POST", "/api/auth/logout", "Revoke the current token", "Auth", "required"),
            endpoint("GET", "/{short_code}", "Redirect to the original URL", "Redirect", "none"),
            endpoint("GET", "/health", "Service and database health", "Ops", "none"),
        ],
    }
}

/// GET /api/docs
pub async fn get_docs() -> impl Responder {
    HttpResponse::Ok().json(api_docs())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/docs", web::get().to(get_docs));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_docs_endpoint_is_healthy() {
        let app = test::init_service(App::new().configure(config)).await;

        let req = test::TestRequest::get().uri("/api/docs").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["title"], "Structo URL Shortener API");
        let endpoints = body["endpoints"].as_array().unwrap();
        assert!(endpoints
            .iter()
            .any(|e| e["method"] == "POST" && e["path"] == "/api/shorten"));
    }
}
