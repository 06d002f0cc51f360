//! In-process fixed window rate limiting, keyed by client IP.
//!
//! Counters are not shared between server instances.

use std::{
    net::IpAddr,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use tracing::warn;

use crate::{
    web::{client_ip::ClientIp, Error, WebResult},
    AppState,
};

/// Above this many tracked clients expired windows get dropped before counting.
const PRUNE_THRESHOLD: usize = 10_000;

const RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed {
        limit: u32,
        remaining: u32,
        reset_after: Duration,
    },
    Limited {
        retry_after: Duration,
    },
}

/// Allows `max` requests per key in every `window`.
/// A key's window opens with its first request and resets once `window` has elapsed.
/// Rejected requests are not counted.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    name: &'static str,
    message: &'static str,
    max: u32,
    window: Duration,
    windows: DashMap<IpAddr, Window>,
}

impl FixedWindowLimiter {
    pub fn new(name: &'static str, message: &'static str, max: u32, window: Duration) -> Self {
        Self {
            name,
            message,
            max,
            window,
            windows: DashMap::new(),
        }
    }

    pub fn check(&self, key: IpAddr) -> Decision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: IpAddr, now: Instant) -> Decision {
        if self.windows.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }

        let mut window = self.windows.entry(key).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        let reset_after = self
            .window
            .saturating_sub(now.duration_since(window.started));

        if window.count >= self.max {
            return Decision::Limited {
                retry_after: reset_after,
            };
        }

        window.count += 1;
        Decision::Allowed {
            limit: self.max,
            remaining: self.max - window.count,
            reset_after,
        }
    }

    /// Drops every window that has already expired.
    pub fn prune(&self, now: Instant) {
        self.windows
            .retain(|_, window| now.duration_since(window.started) < self.window);
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Runs `req` if `client_ip` still has quota in this limiter.
    async fn enforce(&self, client_ip: ClientIp, req: Request, next: Next) -> WebResult<Response> {
        match self.check(client_ip.0) {
            Decision::Allowed {
                limit,
                remaining,
                reset_after,
            } => {
                let mut res = next.run(req).await;
                let headers = res.headers_mut();
                // An inner, stricter limiter already reported its quota.
                if !headers.contains_key(RATELIMIT_LIMIT) {
                    headers.insert(RATELIMIT_LIMIT, HeaderValue::from(limit));
                    headers.insert(RATELIMIT_REMAINING, HeaderValue::from(remaining));
                    headers.insert(RATELIMIT_RESET, HeaderValue::from(ceil_secs(reset_after)));
                }
                Ok(res)
            }
            Decision::Limited { retry_after } => {
                warn!(client = %client_ip, limiter = self.name, "Rate limit exceeded");
                Err(Error::RateLimited {
                    limiter: self.name,
                    message: self.message,
                    retry_after_secs: ceil_secs(retry_after),
                })
            }
        }
    }
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

// ###################################
// ->   MIDDLEWARE
// ###################################
/// Applied to every request the server handles.
pub async fn global_rate_limit(
    State(app_state): State<AppState>,
    client_ip: ClientIp,
    req: Request,
    next: Next,
) -> WebResult<Response> {
    app_state
        .global_limiter
        .enforce(client_ip, req, next)
        .await
}

/// Applied to `POST /api/subscribe` only.
pub async fn subscribe_rate_limit(
    State(app_state): State<AppState>,
    client_ip: ClientIp,
    req: Request,
    next: Next,
) -> WebResult<Response> {
    app_state
        .subscribe_limiter
        .enforce(client_ip, req, next)
        .await
}
