//! Rate limiting primitives for auth flows.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

/// Per-client login throttle. Implementations must count concurrent calls for
/// the same client without undercounting.
pub trait RateLimiter: Send + Sync {
    fn check_and_record(&self, client_id: &str) -> RateLimitDecision;
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check_and_record(&self, _client_id: &str) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }
}

/// Sliding-window limiter: at most `limit` recorded attempts per client within
/// any trailing `window`. Denied attempts are not recorded, so they never
/// extend the lockout. In-memory and best effort; state does not survive a
/// restart.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    limit: usize,
    window: Duration,
    attempts: Mutex<HashMap<String, Vec<Instant>>>,
}

impl SlidingWindowLimiter {
    #[must_use]
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            attempts: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn check_and_record(&self, client_id: &str) -> RateLimitDecision {
        let now = Instant::now();
        let mut attempts = match self.attempts.lock() {
            Ok(guard) => guard,
            // A poisoned lock still holds consistent timestamps.
            Err(poisoned) => poisoned.into_inner(),
        };

        // Drop idle clients so the map does not grow without bound.
        attempts.retain(|_, timestamps| {
            timestamps.retain(|at| now.duration_since(*at) < self.window);
            !timestamps.is_empty()
        });

        let timestamps = attempts.entry(client_id.to_string()).or_default();
        if timestamps.len() >= self.limit {
            return RateLimitDecision::Limited;
        }
        timestamps.push(now);
        RateLimitDecision::Allowed
    }
}
