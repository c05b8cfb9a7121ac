//! Rate limiting for the restaurant API
//!
//! Fixed-window counters keyed by client. Each key may make `max_requests`
//! calls per window; the count resets when the window elapses.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use finder_common::config::RateLimitSettings;

/// Table size at which elapsed windows are pruned during a check
const PRUNE_THRESHOLD: usize = 10_000;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
    /// When false every request is allowed
    pub enabled: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
            enabled: true,
        }
    }
}

impl From<&RateLimitSettings> for RateLimitConfig {
    fn from(settings: &RateLimitSettings) -> Self {
        Self {
            max_requests: settings.max_requests,
            window: Duration::from_secs(settings.window_secs),
            enabled: settings.enabled,
        }
    }
}

#[derive(Debug, Clone)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window limiter shared by all workers
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request against `key`
    pub fn check(&self, key: &str) -> RateLimitResult {
        let limit = self.config.max_requests;
        if !self.config.enabled {
            return RateLimitResult::Allowed {
                remaining: limit,
                limit,
            };
        }

        let now = Instant::now();
        let mut windows = self.windows.lock();
        if windows.len() >= PRUNE_THRESHOLD {
            prune(&mut windows, now, self.config.window);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        let elapsed = now.duration_since(window.started);
        if elapsed >= self.config.window {
            window.started = now;
            window.count = 0;
        }

        if window.count < limit {
            window.count += 1;
            RateLimitResult::Allowed {
                remaining: limit - window.count,
                limit,
            }
        } else {
            RateLimitResult::Limited {
                retry_after: self.config.window.saturating_sub(now.duration_since(window.started)),
                limit,
            }
        }
    }

    /// Check by IP address
    pub fn check_ip(&self, ip: IpAddr) -> RateLimitResult {
        self.check(&format!("ip:{ip}"))
    }

    /// Drop windows that have already elapsed
    pub fn cleanup(&self) {
        prune(&mut self.windows.lock(), Instant::now(), self.config.window);
    }

    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.windows.lock().len()
    }
}

fn prune(windows: &mut HashMap<String, Window>, now: Instant, length: Duration) {
    windows.retain(|_, w| now.duration_since(w.started) < length);
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in window
        remaining: u32,
        /// Total limit
        limit: u32,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window resets
        retry_after: Duration,
        /// Total limit
        limit: u32,
    },
}

impl RateLimitResult {
    /// Check if request is allowed
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Get retry-after duration if limited
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Limited { retry_after, .. } => Some(*retry_after),
            Self::Allowed { .. } => None,
        }
    }
}
