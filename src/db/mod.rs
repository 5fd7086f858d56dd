// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod click_repository;
pub mod url_repository;
pub mod user_repository;

pub use click_repository::*;
pub use url_repository::*;
pub use user_repository::*;

#[cfg(test)]
pub(crate) mod test_support {
    use super::{ShortenedUrlRepository, UserRepository};
    use crate::models::{NewShortenedUrl, ShortenedUrl, User};
    use crate::services::codes::generate_short_code;
    use sqlx::PgPool;
    use uuid::Uuid;

    pub async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.expect("database connection");
        sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");
        pool
    }

    /// User with a unique name; the hash is never verified
    pub async fn create_user(pool: &PgPool, prefix: &str) -> User {
        let username = format!("{}_{}", prefix, generate_short_code(8));
        UserRepository::create_user(pool, &username, "someone@example.com", "not-a-real-hash")
            .await
            .unwrap()
    }

    pub async fn create_url(pool: &PgPool, owner: Option<Uuid>) -> ShortenedUrl {
        ShortenedUrlRepository::insert(
            pool,
            &NewShortenedUrl {
                original_url: "https://example.com/page".to_string(),
                short_code: generate_short_code(12),
                is_custom_code: false,
                created_by: owner,
                expires_at: None,
            },
        )
        .await
        .unwrap()
    }
}
