//! Live usage counters for the veterinary service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Request and feature counters shared by middleware and handlers.
///
/// Counters only ever grow; the average response time is derived from the
/// accumulated elapsed time so concurrent updates never lose a sample.
#[derive(Debug, Default)]
pub struct UsageTracker {
    requests: AtomicU64,
    successes: AtomicU64,
    elapsed_ms: AtomicU64,
    medications_generated: AtomicU64,
    translations: AtomicU64,
}

impl UsageTracker {
    /// Record a finished request.
    pub fn record_request(&self, status: u16, elapsed: Duration) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if status < 400 {
            self.successes.fetch_add(1, Ordering::Relaxed);
        }
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.elapsed_ms.fetch_add(millis, Ordering::Relaxed);
    }

    /// Record medications written to the store by a generator.
    pub fn record_medications(&self, count: usize) {
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        self.medications_generated.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a completed translation.
    pub fn record_translation(&self) {
        self.translations.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the counters.
    #[must_use]
    pub fn snapshot(&self, active_sessions: usize, now: DateTime<Utc>) -> UsageSnapshot {
        let total = self.requests.load(Ordering::Relaxed);
        let elapsed = self.elapsed_ms.load(Ordering::Relaxed);
        let average = if total == 0 {
            0.0
        } else {
            elapsed as f64 / total as f64
        };
        UsageSnapshot {
            total_queries: total,
            successful_responses: self.successes.load(Ordering::Relaxed),
            average_response_time: average,
            active_sessions,
            medications_generated: self.medications_generated.load(Ordering::Relaxed),
            translations_performed: self.translations.load(Ordering::Relaxed),
            last_updated: now,
        }
    }
}

/// Point-in-time view of [`UsageTracker`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    /// Requests seen.
    pub total_queries: u64,
    /// Requests answered below 400.
    pub successful_responses: u64,
    /// Mean response time in milliseconds.
    pub average_response_time: f64,
    /// Conversation sessions held in memory.
    pub active_sessions: usize,
    /// Medication records produced by AI generation.
    pub medications_generated: u64,
    /// Translations served.
    pub translations_performed: u64,
    /// Snapshot time.
    pub last_updated: DateTime<Utc>,
}

/// Format an uptime as `HH:MM:SS`; hours are not wrapped at 24.
///
/// ```
/// use std::time::Duration;
/// use lvhub::domain::vet::format_clock;
///
/// assert_eq!(format_clock(Duration::from_secs(3_725)), "01:02:05");
/// ```
#[must_use]
pub fn format_clock(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
