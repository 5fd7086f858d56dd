// src/handlers/mod.rs
// DOCUMENTATION: Handlers module organization
// PURPOSE: Re-export handler components

pub mod auth;
pub mod docs;
pub mod health;
pub mod redirect;
pub mod urls;

pub use docs::config as docs_config;
pub use health::config as health_config;
pub use redirect::config as redirect_config;
pub use urls::config as api_config;

use crate::errors::ShortenerError;
use actix_web::web;

/// JSON extractor settings
/// DOCUMENTATION: Malformed or oversized bodies become 400 with the usual error body
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024)
        .error_handler(|err, _req| {
            log::warn!("Rejected request body: {}", err);
            ShortenerError::InvalidInput(format!("Invalid request body: {}", err)).into()
        })
}
