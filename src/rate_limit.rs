// ============================================================================
// Request Rate Limiting
// ============================================================================
//
// Fixed one-minute windows, counted per client IP and across all clients.
// A request must fit in both windows; a rejected request consumes neither.
// Counters live in memory only and reset on restart.
// ============================================================================

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::{SECONDS_PER_MINUTE, SecurityConfig};
use crate::error::AppError;

const WINDOW: Duration = Duration::from_secs(SECONDS_PER_MINUTE);

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

impl Window {
    fn fresh(now: Instant) -> Self {
        Self {
            started_at: now,
            count: 0,
        }
    }

    fn roll(&mut self, now: Instant) {
        if now.duration_since(self.started_at) >= WINDOW {
            *self = Window::fresh(now);
        }
    }
}

struct Counters {
    global: Window,
    per_ip: HashMap<String, Window>,
}

pub struct RateLimiter {
    per_ip_limit: u32,
    global_limit: u32,
    counters: Mutex<Counters>,
}

impl RateLimiter {
    pub fn new(per_ip_limit: u32, global_limit: u32) -> Self {
        Self {
            per_ip_limit,
            global_limit,
            counters: Mutex::new(Counters {
                global: Window::fresh(Instant::now()),
                per_ip: HashMap::new(),
            }),
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(
            config.max_requests_per_ip_per_minute,
            config.max_requests_global_per_minute,
        )
    }

    /// Count one request from `client_ip`, rejecting it if either window is full
    pub async fn check(&self, client_ip: &str) -> Result<(), AppError> {
        let now = Instant::now();
        let mut counters = self.counters.lock().await;

        counters.global.roll(now);
        if counters.global.count >= self.global_limit {
            tracing::warn!(
                limit = self.global_limit,
                "Global rate limit reached"
            );
            return Err(AppError::too_many_requests(
                "relayer is at capacity, retry in a minute",
            ));
        }

        let window = counters
            .per_ip
            .entry(client_ip.to_string())
            .or_insert_with(|| Window::fresh(now));
        window.roll(now);
        if window.count >= self.per_ip_limit {
            tracing::warn!(
                client_ip = %client_ip,
                limit = self.per_ip_limit,
                "Per-IP rate limit reached"
            );
            return Err(AppError::too_many_requests(format!(
                "at most {} requests per minute",
                self.per_ip_limit
            )));
        }

        window.count += 1;
        counters.global.count += 1;
        Ok(())
    }

    /// Forget IPs whose window has closed; returns how many were dropped
    pub async fn prune(&self) -> usize {
        let now = Instant::now();
        let mut counters = self.counters.lock().await;
        let before = counters.per_ip.len();
        counters
            .per_ip
            .retain(|_, window| now.duration_since(window.started_at) < WINDOW);
        before - counters.per_ip.len()
    }
}
