// src/services/rate_limit.rs
// DOCUMENTATION: Per-client request throttling
// PURPOSE: Keyed governor limiters guarding link creation and login

use crate::errors::ShortenerError;
use actix_web::HttpRequest;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::IpAddr;
use std::num::NonZeroU32;

/// Which endpoint family a request is charged against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitedAction {
    Shorten,
    Login,
}

/// Per-IP rate limiters shared across workers
pub struct RateLimiters {
    shorten: DefaultKeyedRateLimiter<String>,
    login: DefaultKeyedRateLimiter<String>,
    trusted_proxies: Vec<IpAddr>,
}

fn per_minute(limit: u32) -> Quota {
    Quota::per_minute(NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN))
}

impl RateLimiters {
    pub fn new(shorten_per_minute: u32, login_per_minute: u32) -> Self {
        Self {
            shorten: RateLimiter::keyed(per_minute(shorten_per_minute)),
            login: RateLimiter::keyed(per_minute(login_per_minute)),
            trusted_proxies: Vec::new(),
        }
    }

    /// Peers whose X-Forwarded-For header is believed
    pub fn with_trusted_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = proxies;
        self
    }

    /// Limiter key for a request
    /// DOCUMENTATION: The connection's peer address. X-Forwarded-For is only
    /// read when the peer is a trusted proxy, walking right to left past
    /// other trusted hops.
    pub fn client_key(&self, req: &HttpRequest) -> String {
        let Some(peer) = req.peer_addr().map(|addr| addr.ip()) else {
            return "unknown".to_string();
        };
        if !self.trusted_proxies.contains(&peer) {
            return peer.to_string();
        }

        let forwarded = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        for hop in forwarded.rsplit(',') {
            match hop.trim().parse::<IpAddr>() {
                Ok(ip) if self.trusted_proxies.contains(&ip) => continue,
                Ok(ip) => return ip.to_string(),
                Err(_) => break,
            }
        }
        peer.to_string()
    }

    /// Charge one request against the limiter for `action`
    pub fn check_request(
        &self,
        action: LimitedAction,
        req: &HttpRequest,
    ) -> Result<(), ShortenerError> {
        self.check(action, &self.client_key(req))
    }

    /// Charge one request for `client` or reject it with 429
    pub fn check(&self, action: LimitedAction, client: &str) -> Result<(), ShortenerError> {
        let limiter = match action {
            LimitedAction::Shorten => &self.shorten,
            LimitedAction::Login => &self.login,
        };

        limiter.check_key(&client.to_string()).map_err(|_| {
            log::warn!("Rate limit exceeded for {:?} from {}", action, client);
            ShortenerError::RateLimitExceeded
        })
    }

    /// Forget clients whose quota has fully replenished
    pub fn retain_recent(&self) {
        self.shorten.retain_recent();
        self.login.retain_recent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn proxy() -> IpAddr {
        "10.0.0.254".parse().unwrap()
    }

    #[test]
    fn test_allows_up_to_quota() {
        let limiters = RateLimiters::new(3, 1);

        for _ in 0..3 {
            assert!(limiters.check(LimitedAction::Shorten, "10.0.0.1").is_ok());
        }
        assert!(matches!(
            limiters.check(LimitedAction::Shorten, "10.0.0.1"),
            Err(ShortenerError::RateLimitExceeded)
        ));
    }

    #[test]
    fn test_clients_are_independent() {
        let limiters = RateLimiters::new(1, 1);

        assert!(limiters.check(LimitedAction::Shorten, "10.0.0.1").is_ok());
        assert!(limiters.check(LimitedAction::Shorten, "10.0.0.2").is_ok());
        assert!(limiters.check(LimitedAction::Shorten, "10.0.0.1").is_err());
    }

    #[test]
    fn test_actions_have_separate_budgets() {
        let limiters = RateLimiters::new(1, 1);

        assert!(limiters.check(LimitedAction::Shorten, "10.0.0.1").is_ok());
        assert!(limiters.check(LimitedAction::Login, "10.0.0.1").is_ok());
        assert!(limiters.check(LimitedAction::Login, "10.0.0.1").is_err());
    }

    #[test]
    fn test_zero_limit_is_clamped_to_one() {
        let limiters = RateLimiters::new(0, 0);
        assert!(limiters.check(LimitedAction::Login, "10.0.0.1").is_ok());
        assert!(limiters.check(LimitedAction::Login, "10.0.0.1").is_err());
    }

    #[test]
    fn test_forwarded_header_ignored_from_untrusted_peer() {
        let limiters = RateLimiters::new(2, 1);

        for i in 0..2 {
            let req = TestRequest::default()
                .peer_addr("10.9.9.9:4000".parse().unwrap())
                .insert_header(("X-Forwarded-For", format!("1.2.3.{}", i)))
                .to_http_request();
            assert_eq!(limiters.client_key(&req), "10.9.9.9");
            assert!(limiters.check_request(LimitedAction::Shorten, &req).is_ok());
        }

        let req = TestRequest::default()
            .peer_addr("10.9.9.9:4000".parse().unwrap())
            .insert_header(("X-Forwarded-For", "1.2.3.200"))
            .to_http_request();
        assert!(matches!(
            limiters.check_request(LimitedAction::Shorten, &req),
            Err(ShortenerError::RateLimitExceeded)
        ));
    }

    #[test]
    fn test_trusted_proxy_forwards_client_address() {
        let limiters = RateLimiters::new(1, 1).with_trusted_proxies(vec![proxy()]);

        let req = TestRequest::default()
            .peer_addr("10.0.0.254:4000".parse().unwrap())
            .insert_header(("X-Forwarded-For", "6.6.6.6, 203.0.113.7, 10.0.0.254"))
            .to_http_request();

        // Only the rightmost untrusted hop counts; spoofed entries before it do not
        assert_eq!(limiters.client_key(&req), "203.0.113.7");
    }

    #[test]
    fn test_trusted_proxy_without_header_uses_peer() {
        let limiters = RateLimiters::new(1, 1).with_trusted_proxies(vec![proxy()]);

        let req = TestRequest::default()
            .peer_addr("10.0.0.254:4000".parse().unwrap())
            .to_http_request();
        assert_eq!(limiters.client_key(&req), "10.0.0.254");
    }
}
