//! Fixed-window rate limiting per client identity.
//!
//! One counter per identity, reset when the window has fully elapsed. The
//! admission check runs before validation and cache lookup, so malformed
//! requests consume rate budget too. A rejected request still counts against
//! the window (no decrement), and a client can burst up to twice the limit
//! across a window boundary — both are accepted characteristics of the
//! fixed-window discipline, not bugs.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::error::{PipelineError, Result};
use crate::telemetry;

/// Configuration for the fixed-window rate limiter.
///
/// ```rust
/// # use mirepoix::RateLimitConfig;
/// # use std::time::Duration;
/// let config = RateLimitConfig::new()
///     .max_requests(10)
///     .window(Duration::from_secs(900));
/// ```
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests admitted per window. Default: 10.
    pub max_requests: u32,
    /// Window duration. Default: 15 minutes.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    /// Create a new config with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum requests per window.
    pub fn max_requests(mut self, max: u32) -> Self {
        self.max_requests = max;
        self
    }

    /// Set the window duration.
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

/// Per-identity request counter for the current window.
#[derive(Debug)]
struct RateWindow {
    count: u32,
    window_start: Instant,
}

/// Fixed-window rate limiter keyed by client identity.
///
/// Windows live in a [`DashMap`]; the entry API serializes updates to one
/// identity's window while leaving different identities uncontended.
pub struct FixedWindowLimiter {
    windows: DashMap<String, RateWindow>,
    config: RateLimitConfig,
}

impl FixedWindowLimiter {
    /// Create a limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    /// Admit or reject a request from `identity`.
    ///
    /// A fresh or expired window restarts at count 1 and admits. Otherwise
    /// the count is incremented first; exceeding the maximum rejects with
    /// [`PipelineError::RateLimited`] without rolling the increment back.
    pub fn admit(&self, identity: &str) -> Result<()> {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(identity.to_string())
            .or_insert_with(|| RateWindow {
                count: 0,
                window_start: now,
            });

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.count = 1;
            entry.window_start = now;
            return Ok(());
        }

        entry.count += 1;
        if entry.count > self.config.max_requests {
            metrics::counter!(telemetry::RATE_LIMITED_TOTAL).increment(1);
            return Err(PipelineError::RateLimited);
        }

        Ok(())
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.windows.len()
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_the_maximum() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig::new().max_requests(10));
        for _ in 0..10 {
            assert!(limiter.admit("1.2.3.4").is_ok());
        }
    }

    #[test]
    fn rejects_the_request_after_the_maximum() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig::new().max_requests(10));
        for _ in 0..10 {
            limiter.admit("1.2.3.4").unwrap();
        }

        let err = limiter.admit("1.2.3.4").unwrap_err();
        assert!(matches!(err, PipelineError::RateLimited));
    }

    #[test]
    fn rejected_requests_still_consume_the_window() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig::new().max_requests(2));
        limiter.admit("a").unwrap();
        limiter.admit("a").unwrap();

        // Every further attempt in this window stays rejected.
        for _ in 0..5 {
            assert!(limiter.admit("a").is_err());
        }
    }

    #[test]
    fn identities_are_independent() {
        let limiter = FixedWindowLimiter::new(RateLimitConfig::new().max_requests(1));
        limiter.admit("a").unwrap();
        assert!(limiter.admit("a").is_err());

        assert!(limiter.admit("b").is_ok());
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let limiter = FixedWindowLimiter::new(
            RateLimitConfig::new()
                .max_requests(1)
                .window(Duration::from_millis(50)),
        );
        limiter.admit("a").unwrap();
        assert!(limiter.admit("a").is_err());

        std::thread::sleep(Duration::from_millis(80));
        assert!(limiter.admit("a").is_ok());
    }

    #[test]
    fn concurrent_admissions_never_exceed_the_limit() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU32, Ordering};
        use std::thread;

        let limiter = Arc::new(FixedWindowLimiter::new(
            RateLimitConfig::new().max_requests(10),
        ));
        let admitted = Arc::new(AtomicU32::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let admitted = Arc::clone(&admitted);
                thread::spawn(move || {
                    for _ in 0..10 {
                        if limiter.admit("shared").is_ok() {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread panicked");
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 10);
    }
}
