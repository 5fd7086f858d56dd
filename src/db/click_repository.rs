// src/db/click_repository.rs
// DOCUMENTATION: Click event storage and aggregation queries
// PURPOSE: Insert click events and compute per-URL analytics in SQL

use crate::errors::ShortenerError;
use crate::models::{ClickEvent, DailyClicks, NamedCount, NewClickEvent};
use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

/// Column a "top N" breakdown groups by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDimension {
    Country,
    Browser,
    Os,
    Device,
    Referrer,
}

impl ClickDimension {
    /// Static column name; never built from user input
    fn column(&self) -> &'static str {
        match self {
            ClickDimension::Country => "country",
            ClickDimension::Browser => "browser",
            ClickDimension::Os => "os",
            ClickDimension::Device => "device_type",
            ClickDimension::Referrer => "referrer",
        }
    }

    /// Device buckets are always reported in full, empty values included
    fn excludes_empty(&self) -> bool {
        !matches!(self, ClickDimension::Device)
    }

    fn limit(&self) -> Option<i64> {
        match self {
            ClickDimension::Device => None,
            _ => Some(10),
        }
    }
}

pub struct ClickRepository;

impl ClickRepository {
    /// Insert a click event
    pub async fn insert<'e, E>(
        executor: E,
        shortened_url_id: Uuid,
        click: &NewClickEvent,
    ) -> Result<ClickEvent, ShortenerError>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, ClickEvent>(
            r#"
            INSERT INTO click_events (
                shortened_url_id, clicked_at, ip_address, country, city,
                browser, browser_version, os, os_version, device_type,
                referrer, user_agent
            )
            VALUES ($1, NOW(), $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(shortened_url_id)
        .bind(&click.ip_address)
        .bind(&click.country)
        .bind(&click.city)
        .bind(&click.browser)
        .bind(&click.browser_version)
        .bind(&click.os)
        .bind(&click.os_version)
        .bind(click.device_type.as_str())
        .bind(&click.referrer)
        .bind(&click.user_agent)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            log::error!("Failed to record click for {}: {}", shortened_url_id, e);
            ShortenerError::DatabaseError(e.to_string())
        })
    }

    /// Distinct client IPs that clicked the URL
    pub async fn unique_visitors(
        pool: &PgPool,
        shortened_url_id: Uuid,
    ) -> Result<i64, ShortenerError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(DISTINCT ip_address) FROM click_events WHERE shortened_url_id = $1",
        )
        .bind(shortened_url_id)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            log::error!("Unique visitor query failed for {}: {}", shortened_url_id, e);
            ShortenerError::DatabaseError(e.to_string())
        })?;

        Ok(count.0)
    }

    /// Clicks per UTC day, oldest first
    pub async fn clicks_by_day(
        pool: &PgPool,
        shortened_url_id: Uuid,
    ) -> Result<Vec<DailyClicks>, ShortenerError> {
        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT (clicked_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS count
            FROM click_events
            WHERE shortened_url_id = $1
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(shortened_url_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Daily click query failed for {}: {}", shortened_url_id, e);
            ShortenerError::DatabaseError(e.to_string())
        })?;

        Ok(rows
            .into_iter()
            .map(|(day, count)| DailyClicks::new(day, count))
            .collect())
    }

    /// Most frequent values of one dimension, by count then name
    pub async fn top_values(
        pool: &PgPool,
        shortened_url_id: Uuid,
        dimension: ClickDimension,
    ) -> Result<Vec<NamedCount>, ShortenerError> {
        let column = dimension.column();
        let mut sql = format!(
            "SELECT {col} AS name, COUNT(*) AS count FROM click_events WHERE shortened_url_id = $1",
            col = column
        );
        if dimension.excludes_empty() {
            sql.push_str(&format!(" AND {} <> ''", column));
        }
        sql.push_str(&format!(" GROUP BY {} ORDER BY count DESC, name ASC", column));
        if let Some(limit) = dimension.limit() {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        log::debug!("Executing analytics query: {}", sql);

        sqlx::query_as::<_, NamedCount>(&sql)
            .bind(shortened_url_id)
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Top {} query failed for {}: {}", column, shortened_url_id, e);
                ShortenerError::DatabaseError(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_breakdown_is_unbounded() {
        assert_eq!(ClickDimension::Device.limit(), None);
        assert!(!ClickDimension::Device.excludes_empty());
    }

    #[test]
    fn test_other_breakdowns_are_top_ten_without_blanks() {
        for dimension in [
            ClickDimension::Country,
            ClickDimension::Browser,
            ClickDimension::Os,
            ClickDimension::Referrer,
        ] {
            assert_eq!(dimension.limit(), Some(10));
            assert!(dimension.excludes_empty());
        }
    }

    use crate::db::test_support::{create_url, test_pool};
    use crate::models::DeviceType;

    async fn insert_click(pool: &PgPool, url_id: Uuid, click: NewClickEvent) -> ClickEvent {
        ClickRepository::insert(pool, url_id, &click).await.unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_top_values_order_limit_and_blanks() {
        let pool = test_pool().await;
        let url = create_url(&pool, None).await;

        let mut countries = vec![("AA", 3), ("CC", 2), ("BB", 2), ("", 2)];
        let singles: Vec<String> = ('A'..='I').map(|c| format!("D{}", c)).collect();
        countries.extend(singles.iter().map(|name| (name.as_str(), 1)));

        let devices = [
            DeviceType::Desktop,
            DeviceType::Mobile,
            DeviceType::Tablet,
            DeviceType::Bot,
            DeviceType::Unknown,
        ];
        let mut n = 0;
        for (country, times) in countries {
            for _ in 0..times {
                let click = NewClickEvent {
                    ip_address: format!("10.0.0.{}", n % 5),
                    country: country.to_string(),
                    device_type: devices[n % devices.len()],
                    ..Default::default()
                };
                insert_click(&pool, url.id, click).await;
                n += 1;
            }
        }

        let top = ClickRepository::top_values(&pool, url.id, ClickDimension::Country)
            .await
            .unwrap();
        let names: Vec<&str> = top.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["AA", "BB", "CC", "DA", "DB", "DC", "DD", "DE", "DF", "DG"]
        );
        assert_eq!(top[0].count, 3);
        assert_eq!(top[1].count, 2);
        assert_eq!(top[2].count, 2);

        // No referrers were recorded, and blanks are not a bucket
        let referrers = ClickRepository::top_values(&pool, url.id, ClickDimension::Referrer)
            .await
            .unwrap();
        assert!(referrers.is_empty());

        let devices_seen = ClickRepository::top_values(&pool, url.id, ClickDimension::Device)
            .await
            .unwrap();
        assert_eq!(devices_seen.len(), devices.len());
        assert_eq!(devices_seen.iter().map(|d| d.count).sum::<i64>(), n as i64);

        assert_eq!(ClickRepository::unique_visitors(&pool, url.id).await.unwrap(), 5);
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL DATABASE_URL"]
    async fn test_clicks_bucketed_by_utc_day() {
        let pool = test_pool().await;
        let url = create_url(&pool, None).await;

        // 01:30 at +02:00 is still the previous day in UTC
        let stamps = [
            "2024-01-02 01:30:00+02",
            "2024-01-01 23:30:00+00",
            "2024-01-02 00:30:00+00",
        ];
        for stamp in stamps {
            let click = insert_click(&pool, url.id, NewClickEvent::default()).await;
            sqlx::query("UPDATE click_events SET clicked_at = $1::timestamptz WHERE id = $2")
                .bind(stamp)
                .bind(click.id)
                .execute(&pool)
                .await
                .unwrap();
        }

        let days = ClickRepository::clicks_by_day(&pool, url.id).await.unwrap();
        assert_eq!(
            days,
            vec![
                DailyClicks {
                    date: "2024-01-01".to_string(),
                    count: 2
                },
                DailyClicks {
                    date: "2024-01-02".to_string(),
                    count: 1
                },
            ]
        );
    }
}
