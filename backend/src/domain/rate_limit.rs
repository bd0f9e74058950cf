//! Fixed-window request counting.
//!
//! Each key gets a window that opens with its first request and lasts
//! `window`. Requests beyond `max_requests` inside the window are refused
//! until it elapses, at which point the count starts again from zero.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

/// Windows kept before expired ones are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// Limiter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

/// Outcome of admitting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Request admitted; `remaining` more fit in the window.
    Allowed { remaining: u32 },
    /// Request refused until the window closes.
    Limited { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: DateTime<Utc>,
    count: u32,
}

/// In-memory fixed-window limiter keyed by caller.
pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    /// Create a limiter.
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Settings in force.
    #[must_use]
    pub const fn config(&self) -> RateLimitConfig {
        self.config
    }

    fn window_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.config.window).unwrap_or(TimeDelta::MAX)
    }

    /// Count a request for `key`.
    ///
    /// A poisoned lock admits the request rather than refusing service.
    pub fn check(&self, key: &str) -> RateDecision {
        let now = self.clock.utc();
        let span = self.window_delta();
        let Ok(mut windows) = self.windows.lock() else {
            return RateDecision::Allowed { remaining: 0 };
        };
        if windows.len() >= SWEEP_THRESHOLD {
            windows.retain(|_, window| now - window.opened < span);
        }
        let window = windows.entry(key.to_owned()).or_insert(Window {
            opened: now,
            count: 0,
        });
        if now - window.opened >= span {
            *window = Window {
                opened: now,
                count: 0,
            };
        }
        if window.count >= self.config.max_requests {
            let retry_after = (window.opened + span - now)
                .to_std()
                .unwrap_or(Duration::ZERO);
            return RateDecision::Limited { retry_after };
        }
        window.count += 1;
        RateDecision::Allowed {
            remaining: self.config.max_requests - window.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MutableClock;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        let start = Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid time");
        Arc::new(MutableClock::new(start))
    }

    fn limiter(clock: &Arc<MutableClock>, max: u32) -> FixedWindowLimiter {
        FixedWindowLimiter::new(
            RateLimitConfig {
                max_requests: max,
                window: Duration::from_secs(60),
            },
            clock.clone(),
        )
    }

    #[rstest]
    fn refuses_after_max_within_window(clock: Arc<MutableClock>) {
        let limiter = limiter(&clock, 3);
        for expected in [2, 1, 0] {
            assert_eq!(
                limiter.check("k"),
                RateDecision::Allowed {
                    remaining: expected
                }
            );
        }
        clock.advance_seconds(20);
        assert_eq!(
            limiter.check("k"),
            RateDecision::Limited {
                retry_after: Duration::from_secs(40)
            }
        );
    }

    #[rstest]
    fn window_resets_entirely(clock: Arc<MutableClock>) {
        let limiter = limiter(&clock, 1);
        assert!(matches!(limiter.check("k"), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check("k"), RateDecision::Limited { .. }));
        clock.advance_seconds(60);
        assert_eq!(limiter.check("k"), RateDecision::Allowed { remaining: 0 });
    }

    #[rstest]
    fn keys_are_independent(clock: Arc<MutableClock>) {
        let limiter = limiter(&clock, 1);
        assert!(matches!(limiter.check("a"), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check("b"), RateDecision::Allowed { .. }));
        assert!(matches!(limiter.check("a"), RateDecision::Limited { .. }));
    }
}
