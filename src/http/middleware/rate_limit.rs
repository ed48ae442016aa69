//! Per-client token bucket rate limiting.
//!
//! Clients are keyed by peer IP from `ConnectInfo`. Requests that carry no
//! peer address (in-process callers) share a single bucket.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::RateLimitConfig;
use crate::http::response::ApiError;
use crate::observability::metrics;

struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_update: Instant::now(),
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

pub struct RateLimiter {
    buckets: Mutex<HashMap<Option<IpAddr>, TokenBucket>>,
    rate: f64,
    burst: f64,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            rate: f64::from(config.requests_per_second),
            burst: f64::from(config.burst_size),
        }
    }

    /// Take one token for `client`, refilling first.
    pub fn check(&self, client: Option<IpAddr>) -> bool {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        buckets
            .entry(client)
            .or_insert_with(|| TokenBucket::new(self.burst))
            .try_acquire(self.burst, self.rate)
    }

    fn describe(&self) -> String {
        format!(
            "limit is {} requests per second with a burst of {}",
            self.rate, self.burst
        )
    }
}

pub async fn rate_limit(State(limiter): State<Arc<RateLimiter>>, request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if limiter.check(client) {
        return next.run(request).await;
    }

    tracing::warn!(client = ?client, path = %request.uri().path(), "Rate limit exceeded");
    metrics::record_rate_limited();
    ApiError::RateLimited {
        details: limiter.describe(),
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(requests_per_second: u32, burst_size: u32) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enabled: true,
            requests_per_second,
            burst_size,
        })
    }

    #[test]
    fn test_burst_then_reject() {
        let limiter = limiter(1, 3);
        let client = Some(IpAddr::from([10, 0, 0, 1]));
        assert!(limiter.check(client));
        assert!(limiter.check(client));
        assert!(limiter.check(client));
        assert!(!limiter.check(client));
    }

    #[test]
    fn test_clients_have_separate_buckets() {
        let limiter = limiter(1, 1);
        assert!(limiter.check(Some(IpAddr::from([10, 0, 0, 1]))));
        assert!(!limiter.check(Some(IpAddr::from([10, 0, 0, 1]))));
        assert!(limiter.check(Some(IpAddr::from([10, 0, 0, 2]))));
        assert!(limiter.check(None));
    }

    #[test]
    fn test_tokens_refill_over_time() {
        let limiter = limiter(1000, 1);
        assert!(limiter.check(None));
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(limiter.check(None));
    }
}
