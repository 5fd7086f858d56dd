// src/bin/healthcheck.rs
// DOCUMENTATION: Container health check
// PURPOSE: Exit 0 when the API answers 2xx, 1 otherwise

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use reqwest::Client;
use std::env;
use std::process;
use std::time::Duration;

const ATTEMPTS: u32 = 2;
const TIMEOUT: Duration = Duration::from_secs(2);
const RETRY_DELAY: Duration = Duration::from_millis(500);

fn target_url() -> String {
    env::var("HEALTHCHECK_URL").unwrap_or_else(|_| {
        let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
        format!("http://127.0.0.1:{}/api/docs", port)
    })
}

async fn check(client: &Client, url: &str) -> Result<()> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request to {} failed", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("{} answered {}", url, status);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let url = target_url();
    let client = match Client::builder().timeout(TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("healthcheck: cannot build HTTP client: {}", e);
            process::exit(1);
        }
    };

    for attempt in 1..=ATTEMPTS {
        match check(&client, &url).await {
            Ok(()) => process::exit(0),
            Err(e) => {
                eprintln!("healthcheck: attempt {}/{}: {:#}", attempt, ATTEMPTS, e);
                if attempt < ATTEMPTS {
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }

    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// HEALTHCHECK --timeout in the Dockerfile
    const RUNTIME_TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_all_attempts_fit_runtime_timeout() {
        let worst_case = TIMEOUT * ATTEMPTS + RETRY_DELAY * (ATTEMPTS - 1);
        assert!(worst_case < RUNTIME_TIMEOUT);
    }

    #[tokio::test]
    async fn test_check_fails_when_nothing_listens() {
        let client = Client::builder().timeout(TIMEOUT).build().unwrap();
        assert!(check(&client, "http://127.0.0.1:1/api/docs").await.is_err());
    }
}
