use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request},
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;

use crate::config::config;
use crate::error::ApiError;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// Entries are swept once the table grows past this many clients
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client IP
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request. Returns false once the client is over its budget.
    pub fn check(&self, ip: IpAddr, now: Instant) -> bool {
        let mut clients = match self.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if clients.len() > SWEEP_THRESHOLD {
            let window = self.window;
            clients.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = clients.entry(ip).or_insert(Window { started: now, count: 0 });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window { started: now, count: 0 };
        }
        entry.count += 1;
        entry.count <= self.max_requests
    }
}

static LIMITER: Lazy<RateLimiter> = Lazy::new(|| {
    let api = &config().api;
    RateLimiter::new(api.rate_limit_requests, Duration::from_secs(api.rate_limit_window_secs))
});

/// Requests without a peer address (in-process test clients) are not counted.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if let Some(ip) = peer {
        if !LIMITER.check(ip, Instant::now()) {
            tracing::warn!("Rate limit exceeded for {}", ip);
            return Err(ApiError::too_many_requests(RATE_LIMIT_MESSAGE));
        }
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn blocks_after_budget_until_window_rolls() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let start = Instant::now();

        assert!(limiter.check(ip, start));
        assert!(limiter.check(ip, start));
        assert!(!limiter.check(ip, start + Duration::from_secs(1)));
        assert!(limiter.check(ip, start + Duration::from_secs(61)));
    }

    #[test]
    fn clients_are_counted_separately() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();

        assert!(limiter.check(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), now));
        assert!(limiter.check(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)), now));
        assert!(!limiter.check(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), now));
    }
}
