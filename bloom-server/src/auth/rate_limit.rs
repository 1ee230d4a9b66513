//! Application-layer rate limiting
//!
//! Process-wide DoS cushion: a fixed window per client IP across all
//! routes. Unrelated to the booking quota model.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use shared::error::{AppError, ErrorCode};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::Instant;

/// Requests allowed per window per client
const MAX_REQUESTS: u32 = 100;
/// Window length, seconds
const WINDOW_SECS: u64 = 15 * 60;

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    inner: Arc<DashMap<String, IpEntry>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    fn check(&self, ip: &str) -> bool {
        let now = Instant::now();

        let mut entry = self.inner.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start).as_secs() >= WINDOW_SECS {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= MAX_REQUESTS
    }

    /// Drop entries whose window has lapsed
    pub fn cleanup(&self) {
        let cutoff = std::time::Duration::from_secs(WINDOW_SECS);
        let now = Instant::now();
        self.inner
            .retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
    }
}

/// Extract client IP: X-Real-IP first, then the last X-Forwarded-For
/// entry, then the peer address.
fn extract_ip(request: &Request) -> String {
    if let Some(real_ip) = request.headers().get("x-real-ip")
        && let Ok(ip) = real_ip.to_str()
    {
        let ip = ip.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    if let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(last) = val.rsplit(',').next()
    {
        let ip = last.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let ip = extract_ip(&request);
    if !limiter.check(&ip) {
        tracing::warn!(ip = %ip, "Rate limit exceeded");
        return Err(AppError::new(ErrorCode::RateLimited).into_response());
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new();
        for _ in 0..MAX_REQUESTS {
            assert!(limiter.check("10.0.0.1"));
        }
        assert!(!limiter.check("10.0.0.1"));
    }

    #[test]
    fn test_limits_are_per_ip() {
        let limiter = RateLimiter::new();
        for _ in 0..=MAX_REQUESTS {
            limiter.check("10.0.0.1");
        }
        assert!(!limiter.check("10.0.0.1"));
        assert!(limiter.check("10.0.0.2"));
    }
}
